use learnly_core::model::{CompletedCourse, CourseId};
use services::Dashboard;

use crate::vm::time_fmt::format_long_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedCourseCardVm {
    pub course_id: CourseId,
    pub title: String,
    pub thumbnail_url: String,
    pub completed_on_str: String,
}

impl From<&CompletedCourse> for CompletedCourseCardVm {
    fn from(item: &CompletedCourse) -> Self {
        Self {
            course_id: item.course.id,
            title: item.course.title.clone(),
            thumbnail_url: item.course.thumbnail_url.clone(),
            completed_on_str: format_long_date(item.completed_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub total: u32,
    pub completed_count: u32,
    pub percentage: u32,
    pub celebrate: bool,
    pub cards: Vec<CompletedCourseCardVm>,
}

#[must_use]
pub fn map_dashboard(dashboard: &Dashboard) -> DashboardVm {
    DashboardVm {
        total: dashboard.stats.total(),
        completed_count: dashboard.stats.completed(),
        percentage: dashboard.stats.percentage(),
        celebrate: dashboard.stats.is_all_complete(),
        cards: dashboard
            .completed
            .iter()
            .map(CompletedCourseCardVm::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnly_core::model::{CompletedCourseInfo, CompletionStats, ProgressId};
    use learnly_core::time::fixed_now;

    #[test]
    fn maps_stats_and_completion_dates() {
        let course_id = CourseId::random();
        let dashboard = Dashboard {
            completed: vec![CompletedCourse {
                progress_id: ProgressId::random(),
                completed_at: fixed_now(),
                course: CompletedCourseInfo {
                    id: course_id,
                    title: "Rust".to_string(),
                    thumbnail_url: String::new(),
                    duration: "1 week".to_string(),
                },
            }],
            stats: CompletionStats::new(1, 1),
        };

        let vm = map_dashboard(&dashboard);
        assert_eq!(vm.percentage, 100);
        assert!(vm.celebrate);
        assert_eq!(vm.cards[0].course_id, course_id);
        assert_eq!(vm.cards[0].completed_on_str, "November 14, 2023");
    }
}
