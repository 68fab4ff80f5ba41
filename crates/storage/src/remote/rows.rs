//! Wire shapes of table rows and their mapping into domain types.

use chrono::{DateTime, Utc};
use learnly_core::model::{
    CompletedCourse, CompletedCourseInfo, Course, CourseId, CourseSummary, ProgressId,
    ProgressRecord, UserId,
};
use serde::{Deserialize, Serialize};

pub(crate) const COURSE_SUMMARY_COLUMNS: &str =
    "id, title, short_description, duration, thumbnail_url, created_at";

pub(crate) const COMPLETED_COURSE_COLUMNS: &str =
    "id, completed_at, courses:course_id ( id, title, thumbnail_url, duration )";

/// Full `courses` row; matches the domain type column for column.
pub(crate) type CourseRow = Course;

pub(crate) type CourseSummaryRow = CourseSummary;

#[derive(Debug, Deserialize)]
pub(crate) struct CourseIdRow {
    pub course_id: CourseId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressRow {
    pub id: ProgressId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

/// A progress row with its course embedded under the `courses` alias.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletedCourseRow {
    pub id: ProgressId,
    pub completed_at: DateTime<Utc>,
    pub courses: Option<CompletedCourseInfo>,
}

impl CompletedCourseRow {
    /// `None` when the referenced course no longer exists.
    pub(crate) fn into_completed(self) -> Option<CompletedCourse> {
        Some(CompletedCourse {
            progress_id: self.id,
            completed_at: self.completed_at,
            course: self.courses?,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProgressRow {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Error body returned by the table API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Postgres `unique_violation`.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
