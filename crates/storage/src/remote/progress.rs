use async_trait::async_trait;
use learnly_core::model::{CompletedCourse, CourseId, ProgressRecord, UserId};

use super::RemoteBackend;
use super::query::TableQuery;
use super::rows::{
    COMPLETED_COURSE_COLUMNS, CompletedCourseRow, CourseIdRow, NewProgressRow, ProgressRow,
};
use crate::repository::{ProgressRepository, StorageError};

const TABLE: &str = "user_progress";

#[async_trait]
impl ProgressRepository for RemoteBackend {
    async fn list_completed_course_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CourseId>, StorageError> {
        let query = TableQuery::from(TABLE)
            .select("course_id")
            .eq("user_id", user_id);
        let rows = self.select::<CourseIdRow>(&query).await?;
        Ok(rows.into_iter().map(|row| row.course_id).collect())
    }

    async fn find_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let query = TableQuery::from(TABLE)
            .select("*")
            .eq("user_id", user_id)
            .eq("course_id", course_id);
        let rows = self.select::<ProgressRow>(&query).await?;
        Ok(rows.into_iter().next().map(ProgressRecord::from))
    }

    async fn insert_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<ProgressRecord, StorageError> {
        let row = NewProgressRow { user_id, course_id };
        let inserted = self.insert::<_, ProgressRow>(TABLE, &row).await?;
        inserted
            .into_iter()
            .next()
            .map(ProgressRecord::from)
            .ok_or_else(|| StorageError::Serialization("insert returned no row".into()))
    }

    async fn list_completed_courses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedCourse>, StorageError> {
        let query = TableQuery::from(TABLE)
            .select(COMPLETED_COURSE_COLUMNS)
            .eq("user_id", user_id)
            .order_desc("completed_at");
        let rows = self.select::<CompletedCourseRow>(&query).await?;
        let total = rows.len();
        let completed: Vec<_> = rows
            .into_iter()
            .filter_map(CompletedCourseRow::into_completed)
            .collect();
        if completed.len() < total {
            tracing::warn!(
                dropped = total - completed.len(),
                "progress rows reference missing courses"
            );
        }
        Ok(completed)
    }
}
