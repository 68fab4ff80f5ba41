use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course as stored in the catalog. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    pub duration: String,
    pub instructor_name: String,
    pub instructor_bio: String,
    pub thumbnail_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// The list-view projection of this course.
    #[must_use]
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            duration: self.duration.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            created_at: self.created_at,
        }
    }

    /// First character of the instructor's name, used for the avatar badge.
    #[must_use]
    pub fn instructor_initial(&self) -> Option<char> {
        self.instructor_name.trim().chars().next()
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Columns fetched for the course list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub duration: String,
    pub thumbnail_url: String,
    pub created_at: DateTime<Utc>,
}

/// Sorts summaries newest first, the order the catalog is presented in.
///
/// The sort is stable, so rows sharing a timestamp keep the backend's order.
pub fn sort_newest_first(courses: &mut [CourseSummary]) {
    courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn course(title: &str, instructor: &str) -> Course {
        Course {
            id: CourseId::random(),
            title: title.into(),
            short_description: "short".into(),
            full_description: "full".into(),
            learning_objectives: vec!["one".into(), "two".into()],
            duration: "4 weeks".into(),
            instructor_name: instructor.into(),
            instructor_bio: "bio".into(),
            thumbnail_url: "https://example.com/a.png".into(),
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[test]
    fn summary_keeps_list_columns() {
        let course = course("Rust", "Ferris");
        let summary = course.summary();
        assert_eq!(summary.id, course.id);
        assert_eq!(summary.title, "Rust");
        assert_eq!(summary.duration, "4 weeks");
        assert_eq!(summary.created_at, course.created_at);
    }

    #[test]
    fn instructor_initial_skips_leading_space() {
        assert_eq!(course("x", "  Ada").instructor_initial(), Some('A'));
        assert_eq!(course("x", "").instructor_initial(), None);
    }

    #[test]
    fn sort_newest_first_orders_by_created_at_desc() {
        let base = fixed_now();
        let mut items: Vec<CourseSummary> = [0, 2, 1]
            .into_iter()
            .map(|days| {
                let mut summary = course(&format!("c{days}"), "i").summary();
                summary.created_at = base + Duration::days(days);
                summary
            })
            .collect();

        sort_newest_first(&mut items);

        let titles: Vec<_> = items.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["c2", "c1", "c0"]);
    }
}
