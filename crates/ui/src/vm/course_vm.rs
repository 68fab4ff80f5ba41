use learnly_core::model::{Course, CourseId};
use services::CourseListItem;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub duration: String,
    pub thumbnail_url: String,
    pub completed: bool,
}

impl From<&CourseListItem> for CourseCardVm {
    fn from(item: &CourseListItem) -> Self {
        let course = &item.course;
        Self {
            id: course.id,
            title: course.title.clone(),
            short_description: course.short_description.clone(),
            duration: course.duration.clone(),
            thumbnail_url: course.thumbnail_url.clone(),
            completed: item.completed,
        }
    }
}

#[must_use]
pub fn map_course_cards(items: &[CourseListItem]) -> Vec<CourseCardVm> {
    items.iter().map(CourseCardVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseDetailVm {
    pub id: CourseId,
    pub title: String,
    pub full_description: String,
    pub learning_objectives: Vec<String>,
    pub duration: String,
    pub instructor_name: String,
    pub instructor_bio: String,
    /// Empty when the instructor has no name.
    pub instructor_initial: String,
    pub thumbnail_url: String,
}

impl From<&Course> for CourseDetailVm {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            full_description: course.full_description.clone(),
            learning_objectives: course.learning_objectives.clone(),
            duration: course.duration.clone(),
            instructor_name: course.instructor_name.clone(),
            instructor_bio: course.instructor_bio.clone(),
            instructor_initial: course
                .instructor_initial()
                .map(String::from)
                .unwrap_or_default(),
            thumbnail_url: course.thumbnail_url.clone(),
        }
    }
}
