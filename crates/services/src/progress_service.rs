use std::sync::Arc;

use learnly_core::model::{CourseId, ProgressRecord, User};
use storage::{ProgressRepository, StorageError};

use crate::error::ProgressError;

/// Why a mark-complete request never reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SignedOut,
    AlreadyCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkCompleteOutcome {
    Skipped(SkipReason),
    Completed(ProgressRecord),
    /// The backend already held a record for this (user, course).
    AlreadyCompleted,
}

impl MarkCompleteOutcome {
    /// Whether the course should now render as completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !matches!(self, Self::Skipped(SkipReason::SignedOut))
    }
}

/// Records course completions for the signed-in user.
#[derive(Clone)]
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// Mark `course_id` complete for `user`.
    ///
    /// Does nothing without a user or when the course is already known to be
    /// completed. A uniqueness conflict from the backend counts as success.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the insert fails for any other reason.
    pub async fn mark_complete(
        &self,
        user: Option<&User>,
        course_id: CourseId,
        already_completed: bool,
    ) -> Result<MarkCompleteOutcome, ProgressError> {
        let Some(user) = user else {
            return Ok(MarkCompleteOutcome::Skipped(SkipReason::SignedOut));
        };
        if already_completed {
            return Ok(MarkCompleteOutcome::Skipped(SkipReason::AlreadyCompleted));
        }

        match self.progress.insert_progress(user.id, course_id).await {
            Ok(record) => {
                tracing::info!(user = %user.id, %course_id, "course marked complete");
                Ok(MarkCompleteOutcome::Completed(record))
            }
            Err(StorageError::Conflict) => {
                tracing::warn!(user = %user.id, %course_id, "course was already completed");
                Ok(MarkCompleteOutcome::AlreadyCompleted)
            }
            Err(err) => {
                tracing::error!(error = %err, %course_id, "error marking course as complete");
                Err(err.into())
            }
        }
    }
}
