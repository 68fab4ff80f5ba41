use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, ProgressId, UserId};

/// A row of `user_progress`: one user finished one course.
///
/// The backend keeps at most one record per (user, course) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Course columns embedded in a progress row by the relational join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedCourseInfo {
    pub id: CourseId,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: String,
}

/// A progress record joined with the course it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedCourse {
    pub progress_id: ProgressId,
    pub completed_at: DateTime<Utc>,
    pub course: CompletedCourseInfo,
}

/// The set of course ids a user has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet(HashSet<CourseId>);

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, course_id: CourseId) -> bool {
        self.0.contains(&course_id)
    }

    pub fn insert(&mut self, course_id: CourseId) -> bool {
        self.0.insert(course_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CourseId> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
