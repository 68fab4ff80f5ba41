mod account;
mod course;
mod ids;
mod progress;
mod stats;

pub use account::{Credentials, CredentialsError, MIN_PASSWORD_LEN, Session, User};
pub use course::{Course, CourseSummary, sort_newest_first};
pub use ids::{CourseId, ParseIdError, ProgressId, UserId};
pub use progress::{CompletedCourse, CompletedCourseInfo, CompletionSet, ProgressRecord};
pub use stats::CompletionStats;
