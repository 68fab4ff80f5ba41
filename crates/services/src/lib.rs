#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod dashboard_service;
pub mod error;
pub mod progress_service;
pub mod session_holder;

pub use learnly_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CourseCatalogService, CourseDetail, CourseListItem, CourseLookup};
pub use dashboard_service::{Dashboard, DashboardService};
pub use error::{AppServicesError, AuthError, ProgressError};
pub use progress_service::{MarkCompleteOutcome, ProgressService, SkipReason};
pub use session_holder::{AuthSnapshot, SessionEvent, SessionHolder, SignUpOutcome, Subscription};
