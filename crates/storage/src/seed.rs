//! Sample catalog for the demo backend.

use chrono::{DateTime, Duration, Utc};
use learnly_core::model::{Course, CourseId, Credentials};

use crate::repository::{InMemoryRepository, StorageError};

pub const DEMO_EMAIL: &str = "demo@learnly.dev";
pub const DEMO_PASSWORD: &str = "learnly-demo";

struct SeedCourse {
    title: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    objectives: &'static [&'static str],
    duration: &'static str,
    instructor_name: &'static str,
    instructor_bio: &'static str,
    thumbnail_url: &'static str,
}

const COURSES: &[SeedCourse] = &[
    SeedCourse {
        title: "Web Development Fundamentals",
        short_description: "Build your first websites with HTML, CSS, and a little JavaScript.",
        full_description: "Start from a blank file and finish with a responsive, accessible site. \
            Each module pairs a short lesson with a hands-on exercise.",
        objectives: &[
            "Structure documents with semantic HTML",
            "Lay out pages with Flexbox and Grid",
            "Add interactivity with DOM events",
        ],
        duration: "6 weeks",
        instructor_name: "Sarah Johnson",
        instructor_bio: "Front-end engineer with a decade of experience teaching bootcamps.",
        thumbnail_url: "https://images.pexels.com/photos/270348/pexels-photo-270348.jpeg",
    },
    SeedCourse {
        title: "Data Science with Python",
        short_description: "Clean, explore, and chart real data sets with pandas and matplotlib.",
        full_description: "A practical introduction to the data science workflow, from loading \
            messy CSV files to presenting findings.",
        objectives: &[
            "Load and clean tabular data",
            "Summarize data with group-by and pivots",
            "Communicate results with charts",
        ],
        duration: "8 weeks",
        instructor_name: "Michael Chen",
        instructor_bio: "Data scientist who has shipped analytics in healthcare and retail.",
        thumbnail_url: "https://images.pexels.com/photos/590022/pexels-photo-590022.jpeg",
    },
    SeedCourse {
        title: "UX Design Essentials",
        short_description: "Learn to research, sketch, and test interfaces people enjoy using.",
        full_description: "Covers the full design loop: interviews, journey maps, wireframes, \
            prototypes, and usability testing.",
        objectives: &[
            "Plan and run user interviews",
            "Turn findings into wireframes",
            "Test prototypes and iterate",
        ],
        duration: "4 weeks",
        instructor_name: "Emily Rodriguez",
        instructor_bio: "Product designer focused on research-driven design systems.",
        thumbnail_url: "https://images.pexels.com/photos/196644/pexels-photo-196644.jpeg",
    },
];

/// Sample courses, the first one newest, spaced a day apart before `now`.
#[must_use]
pub fn demo_courses(now: DateTime<Utc>) -> Vec<Course> {
    COURSES
        .iter()
        .zip(0_i64..)
        .map(|(seed, age)| {
            let created = now - Duration::days(age + 1);
            Course {
                id: CourseId::random(),
                title: seed.title.to_string(),
                short_description: seed.short_description.to_string(),
                full_description: seed.full_description.to_string(),
                learning_objectives: seed.objectives.iter().map(|o| (*o).to_string()).collect(),
                duration: seed.duration.to_string(),
                instructor_name: seed.instructor_name.to_string(),
                instructor_bio: seed.instructor_bio.to_string(),
                thumbnail_url: seed.thumbnail_url.to_string(),
                created_at: created,
                updated_at: created,
            }
        })
        .collect()
}

/// Load the sample courses and the demo account into `repo`.
///
/// # Errors
///
/// Returns `StorageError` if the repository rejects a row or the demo
/// account already exists.
pub fn seed_demo(repo: &InMemoryRepository, now: DateTime<Utc>) -> Result<(), StorageError> {
    for course in demo_courses(now) {
        repo.put_course(course)?;
    }
    let credentials = Credentials::new(DEMO_EMAIL, DEMO_PASSWORD)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    repo.register(&credentials)?;
    Ok(())
}
