use async_trait::async_trait;
use learnly_core::model::{Course, CourseId, CourseSummary};

use super::RemoteBackend;
use super::query::TableQuery;
use super::rows::{COURSE_SUMMARY_COLUMNS, CourseRow, CourseSummaryRow};
use crate::repository::{CourseRepository, StorageError};

const TABLE: &str = "courses";

#[async_trait]
impl CourseRepository for RemoteBackend {
    async fn list_course_summaries(&self) -> Result<Vec<CourseSummary>, StorageError> {
        let query = TableQuery::from(TABLE)
            .select(COURSE_SUMMARY_COLUMNS)
            .order_desc("created_at");
        self.select::<CourseSummaryRow>(&query).await
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let query = TableQuery::from(TABLE).select("*").eq("id", id);
        let rows = self.select::<CourseRow>(&query).await?;
        Ok(rows.into_iter().next())
    }

    async fn count_courses(&self) -> Result<u32, StorageError> {
        let query = TableQuery::from(TABLE).select("id");
        self.count(&query).await
    }
}
