mod course_vm;
mod dashboard_vm;
mod time_fmt;

pub use course_vm::{CourseCardVm, CourseDetailVm, map_course_cards};
pub use dashboard_vm::{CompletedCourseCardVm, DashboardVm, map_dashboard};
pub use time_fmt::format_long_date;
