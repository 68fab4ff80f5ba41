use std::sync::Arc;

use learnly_core::model::{CompletionSet, Course, CourseId, CourseSummary, User};
use storage::{CourseRepository, ProgressRepository};

/// A course in the list, annotated for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListItem {
    pub course: CourseSummary,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course: Course,
    pub completed: bool,
}

/// Result of looking a course up by id. A missing course is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseLookup {
    Found(CourseDetail),
    NotFound,
}

/// Read side of the catalog.
///
/// Read failures never reach the caller: they are logged and the result
/// degrades to "no data" so pages render an empty state instead of an error.
#[derive(Clone)]
pub struct CourseCatalogService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CourseCatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { courses, progress }
    }

    /// All courses, newest first, each flagged if `user` completed it.
    ///
    /// The course list and the user's progress are fetched concurrently.
    pub async fn list_courses(&self, user: Option<&User>) -> Vec<CourseListItem> {
        let courses = async {
            self.courses
                .list_course_summaries()
                .await
                .unwrap_or_else(|err| {
                    tracing::error!(error = %err, "error fetching courses");
                    Vec::new()
                })
        };
        let completed = self.completed_set(user);
        let (courses, completed) = futures::join!(courses, completed);

        courses
            .into_iter()
            .map(|course| CourseListItem {
                completed: completed.contains(course.id),
                course,
            })
            .collect()
    }

    /// Full course record plus whether `user` has completed it.
    pub async fn course_detail(&self, course_id: CourseId, user: Option<&User>) -> CourseLookup {
        let course = async {
            self.courses.get_course(course_id).await.unwrap_or_else(|err| {
                tracing::error!(error = %err, %course_id, "error fetching course");
                None
            })
        };
        let completed = async {
            let Some(user) = user else {
                return false;
            };
            match self.progress.find_progress(user.id, course_id).await {
                Ok(record) => record.is_some(),
                Err(err) => {
                    tracing::error!(error = %err, %course_id, "error checking completion");
                    false
                }
            }
        };
        let (course, completed) = futures::join!(course, completed);

        match course {
            Some(course) => CourseLookup::Found(CourseDetail { course, completed }),
            None => CourseLookup::NotFound,
        }
    }

    async fn completed_set(&self, user: Option<&User>) -> CompletionSet {
        let Some(user) = user else {
            return CompletionSet::new();
        };
        match self.progress.list_completed_course_ids(user.id).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                tracing::error!(error = %err, "error fetching user progress");
                CompletionSet::new()
            }
        }
    }
}
