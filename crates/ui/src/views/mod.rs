mod auth;
mod course_details;
mod courses;
mod dashboard;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use auth::AuthView;
pub use course_details::CourseDetailsView;
pub use courses::CoursesView;
pub use dashboard::DashboardView;
pub use state::{ViewState, view_state_from_resource};
