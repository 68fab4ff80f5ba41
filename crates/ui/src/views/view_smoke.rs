use std::sync::Arc;

use chrono::Duration;
use learnly_core::model::{
    CompletedCourse, Course, CourseId, CourseSummary, ProgressRecord, UserId,
};
use learnly_core::time::{fixed_clock, fixed_now};
use storage::{
    AuthProvider, CourseRepository, InMemoryRepository, ProgressRepository, Storage, StorageError,
};

use super::test_harness::{ViewKind, register_test_user, setup_view_harness};

fn build_course(title: &str, age_days: i64) -> Course {
    let created = fixed_now() - Duration::days(age_days);
    Course {
        id: CourseId::random(),
        title: title.to_string(),
        short_description: format!("{title} in brief"),
        full_description: format!("{title} in depth"),
        learning_objectives: vec!["Ship something".to_string(), "Read the docs".to_string()],
        duration: "4 weeks".to_string(),
        instructor_name: "Grace Hopper".to_string(),
        instructor_bio: "Wrote the first compiler.".to_string(),
        thumbnail_url: "https://example.com/thumb.png".to_string(),
        created_at: created,
        updated_at: created,
    }
}

fn seeded_repo(courses: &[Course]) -> InMemoryRepository {
    let repo = InMemoryRepository::with_clock(fixed_clock());
    for course in courses {
        repo.put_course(course.clone()).expect("put course");
    }
    register_test_user(&repo);
    repo
}

struct Offline;

#[async_trait::async_trait]
impl CourseRepository for Offline {
    async fn list_course_summaries(&self) -> Result<Vec<CourseSummary>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn get_course(&self, _id: CourseId) -> Result<Option<Course>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn count_courses(&self) -> Result<u32, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }
}

#[async_trait::async_trait]
impl ProgressRepository for Offline {
    async fn list_completed_course_ids(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<CourseId>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn find_progress(
        &self,
        _user_id: UserId,
        _course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn insert_progress(
        &self,
        _user_id: UserId,
        _course_id: CourseId,
    ) -> Result<ProgressRecord, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn list_completed_courses(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<CompletedCourse>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }
}

fn offline_storage(repo: InMemoryRepository) -> Storage {
    let auth: Arc<dyn AuthProvider> = Arc::new(repo);
    Storage {
        courses: Arc::new(Offline),
        progress: Arc::new(Offline),
        auth,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_lists_newest_first_with_badges() {
    let old = build_course("Older Course", 5);
    let new = build_course("Newer Course", 1);
    let repo = seeded_repo(&[old.clone(), new.clone()]);

    let mut harness =
        setup_view_harness(ViewKind::Courses, Storage::from_repository(repo.clone()), true).await;
    let user = harness.user.clone().expect("signed in");
    repo.insert_progress(user.id, old.id).await.expect("progress");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Available Courses"), "missing title in {html}");
    let newer = html.find("Newer Course").expect("newer course rendered");
    let older = html.find("Older Course").expect("older course rendered");
    assert!(newer < older, "courses not newest first in {html}");
    assert_eq!(html.matches("Completed").count(), 1, "expected one badge in {html}");
    assert!(html.contains("View Details"), "missing action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_renders_empty_state() {
    let repo = seeded_repo(&[]);
    let mut harness =
        setup_view_harness(ViewKind::Courses, Storage::from_repository(repo), true).await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No courses available yet"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_degrades_to_empty_on_fetch_error() {
    let repo = seeded_repo(&[]);
    let mut harness = setup_view_harness(ViewKind::Courses, offline_storage(repo), true).await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No courses available yet"), "missing empty state in {html}");
    assert!(!html.contains("Loading..."), "spinner still shown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_details_view_smoke_renders_course() {
    let course = build_course("Rust for Beginners", 1);
    let repo = seeded_repo(&[course.clone()]);
    let mut harness = setup_view_harness(
        ViewKind::CourseDetails(course.id),
        Storage::from_repository(repo),
        true,
    )
    .await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Rust for Beginners"), "missing title in {html}");
    assert!(html.contains("About This Course"), "missing about in {html}");
    assert!(html.contains("Read the docs"), "missing objective in {html}");
    assert!(html.contains("Instructor: Grace Hopper"), "missing instructor in {html}");
    assert!(html.contains("Mark as Completed"), "missing action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_details_view_smoke_unknown_id_is_not_found() {
    let repo = seeded_repo(&[]);
    let mut harness = setup_view_harness(
        ViewKind::CourseDetails(CourseId::random()),
        Storage::from_repository(repo),
        true,
    )
    .await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Course not found"), "missing not-found in {html}");
    assert!(html.contains("Go back to courses"), "missing back action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_details_view_smoke_prompts_signed_out_user() {
    let course = build_course("Rust for Beginners", 1);
    let repo = seeded_repo(&[course.clone()]);
    let mut harness = setup_view_harness(
        ViewKind::CourseDetails(course.id),
        Storage::from_repository(repo),
        false,
    )
    .await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Sign in to track your progress and mark courses as completed"),
        "missing sign-in prompt in {html}"
    );
    assert!(!html.contains("Mark as Completed"), "unexpected action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_details_view_smoke_marks_course_complete() {
    let course = build_course("Rust for Beginners", 1);
    let repo = seeded_repo(&[course.clone()]);
    let mut harness = setup_view_harness(
        ViewKind::CourseDetails(course.id),
        Storage::from_repository(repo.clone()),
        true,
    )
    .await;
    let user = harness.user.clone().expect("signed in");

    harness.rebuild();
    harness.settle().await;
    harness.mark_complete();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("badge--completed"), "missing badge in {html}");
    assert!(!html.contains("Mark as Completed"), "action still shown in {html}");
    assert_eq!(repo.progress_count(user.id, course.id).expect("count"), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn course_details_view_smoke_alerts_when_marking_fails() {
    let course = build_course("Rust for Beginners", 1);
    let repo = seeded_repo(&[course.clone()]);
    let auth: Arc<dyn AuthProvider> = Arc::new(repo.clone());
    let storage = Storage {
        courses: Arc::new(repo.clone()),
        progress: Arc::new(Offline),
        auth,
    };
    let mut harness =
        setup_view_harness(ViewKind::CourseDetails(course.id), storage, true).await;

    harness.rebuild();
    harness.settle().await;
    harness.mark_complete();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Failed to mark course as complete. Please try again."),
        "missing alert in {html}"
    );
    assert!(html.contains("Mark as Completed"), "retry not offered in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_empty_catalog() {
    let repo = seeded_repo(&[]);
    let mut harness =
        setup_view_harness(ViewKind::Dashboard, Storage::from_repository(repo), true).await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("My Dashboard"), "missing title in {html}");
    assert!(html.contains("0%"), "missing zero percent in {html}");
    assert!(html.contains("No courses completed yet"), "missing empty state in {html}");
    assert!(!html.contains("Congratulations!"), "unexpected banner in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_celebrates_full_completion() {
    let first = build_course("First", 2);
    let second = build_course("Second", 1);
    let repo = seeded_repo(&[first.clone(), second.clone()]);
    let mut harness =
        setup_view_harness(ViewKind::Dashboard, Storage::from_repository(repo.clone()), true)
            .await;
    let user = harness.user.clone().expect("signed in");
    repo.insert_progress(user.id, first.id).await.expect("progress");
    repo.insert_progress(user.id, second.id).await.expect("progress");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("100%"), "missing percentage in {html}");
    assert!(html.contains("Congratulations!"), "missing banner in {html}");
    assert!(
        html.contains("Completed on November 14, 2023"),
        "missing completion date in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn auth_view_smoke_renders_login_form() {
    let repo = seeded_repo(&[]);
    let mut harness =
        setup_view_harness(ViewKind::Auth, Storage::from_repository(repo), false).await;

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign In"), "missing sign-in button in {html}");
    assert!(html.contains("Sign up"), "missing sign-up toggle in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn auth_gate_smoke_shows_loading_then_login() {
    let repo = seeded_repo(&[]);
    let mut harness =
        setup_view_harness(ViewKind::Gate, Storage::from_repository(repo), false).await;

    harness.dom.rebuild_in_place();
    let html = harness.render();
    assert!(html.contains("Loading..."), "missing loading state in {html}");

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Welcome back"), "missing login form in {html}");
    assert_eq!(harness.services.session().listener_count(), 1);
}
