use std::sync::Arc;

use learnly_core::model::{CompletedCourse, CompletionStats, User};
use storage::{CourseRepository, ProgressRepository};

/// Everything the dashboard page renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    /// Most recently completed first.
    pub completed: Vec<CompletedCourse>,
    pub stats: CompletionStats,
}

#[derive(Clone)]
pub struct DashboardService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { courses, progress }
    }

    /// Completed courses and completion stats for `user`.
    ///
    /// Both queries run concurrently and degrade independently: a failed
    /// progress query yields no completions, a failed count yields a total of 0.
    pub async fn load(&self, user: Option<&User>) -> Dashboard {
        let Some(user) = user else {
            return Dashboard::default();
        };

        let completed = async {
            self.progress
                .list_completed_courses(user.id)
                .await
                .unwrap_or_else(|err| {
                    tracing::error!(error = %err, "error fetching completed courses");
                    Vec::new()
                })
        };
        let total = async {
            self.courses.count_courses().await.unwrap_or_else(|err| {
                tracing::error!(error = %err, "error counting courses");
                0
            })
        };
        let (completed, total) = futures::join!(completed, total);

        let done = u32::try_from(completed.len()).unwrap_or(u32::MAX);
        Dashboard {
            stats: CompletionStats::new(done, total),
            completed,
        }
    }
}
