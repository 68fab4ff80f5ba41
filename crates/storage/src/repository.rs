use async_trait::async_trait;
use learnly_core::model::{
    CompletedCourse, CompletedCourseInfo, Course, CourseId, CourseSummary, Credentials,
    ProgressId, ProgressRecord, Session, User, UserId, sort_newest_first,
};
use learnly_core::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict")]
    Conflict,

    /// The auth service refused the request (bad credentials, expired token).
    #[error("{0}")]
    Unauthorized(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },
}

/// Read access to the `courses` table.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// List summary columns of every course, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn list_course_summaries(&self) -> Result<Vec<CourseSummary>, StorageError>;

    /// Fetch a full course by exact id.
    ///
    /// Returns `Ok(None)` when no row matches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Count all courses without materializing rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn count_courses(&self) -> Result<u32, StorageError>;
}

/// Access to the `user_progress` table.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Ids of every course the user has completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn list_completed_course_ids(&self, user_id: UserId)
    -> Result<Vec<CourseId>, StorageError>;

    /// The progress record for (user, course), if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn find_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Insert a progress record; the backend assigns id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a record for (user, course) exists,
    /// or other storage errors.
    async fn insert_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<ProgressRecord, StorageError>;

    /// Progress records joined with their course, most recently completed first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn list_completed_courses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedCourse>, StorageError>;
}

/// Called when the backend drops a session it can no longer renew.
pub type SessionLostHook = Arc<dyn Fn() + Send + Sync>;

/// Contract of the hosted auth service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` for rejected credentials, or other
    /// storage errors.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StorageError>;

    /// Register a new account.
    ///
    /// Returns `Ok(None)` when the account was created but must be confirmed
    /// before a session is issued.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` if the service refuses the sign-up,
    /// or other storage errors.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, StorageError>;

    /// Revoke the session and forget any persisted copy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the revocation request fails; the persisted
    /// copy is kept in that case.
    async fn sign_out(&self, session: &Session) -> Result<(), StorageError>;

    /// The persisted session, refreshed if it had expired. `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persisted session cannot be read.
    async fn current_session(&self) -> Result<Option<Session>, StorageError>;

    /// Register `hook` to run whenever the provider discards the held session
    /// outside of [`AuthProvider::sign_out`], such as an expired token that
    /// could not be refreshed.
    fn on_session_lost(&self, hook: SessionLostHook);
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// Simple in-memory backend for tests, demos, and prototyping.
///
/// Mirrors the hosted backend's contract: newest-first ordering, server-side
/// timestamps, and the one-record-per-(user, course) constraint.
#[derive(Clone)]
pub struct InMemoryRepository {
    clock: Clock,
    require_confirmation: bool,
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    progress: Arc<Mutex<Vec<ProgressRecord>>>,
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    session: Arc<Mutex<Option<Session>>>,
    lost_hooks: Arc<Mutex<Vec<SessionLostHook>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Clock::default_clock())
    }

    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            require_confirmation: false,
            courses: Arc::new(Mutex::new(HashMap::new())),
            progress: Arc::new(Mutex::new(Vec::new())),
            accounts: Arc::new(Mutex::new(HashMap::new())),
            session: Arc::new(Mutex::new(None)),
            lost_hooks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle onto the same data that stamps new rows with `clock`.
    #[must_use]
    pub fn reclocked(&self, clock: Clock) -> Self {
        Self {
            clock,
            ..self.clone()
        }
    }

    /// Sign-ups create the account but issue no session.
    #[must_use]
    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Insert or replace a course row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn put_course(&self, course: Course) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(course.id, course);
        Ok(())
    }

    /// Register an account without signing it in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is taken.
    pub fn register(&self, credentials: &Credentials) -> Result<User, StorageError> {
        let mut guard = self
            .accounts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = credentials.email().to_lowercase();
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        let user = User {
            id: UserId::random(),
            email: credentials.email().to_owned(),
        };
        guard.insert(
            key,
            Account {
                user: user.clone(),
                password: credentials.password().to_owned(),
            },
        );
        Ok(user)
    }

    /// Number of progress rows for (user, course).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn progress_count(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<usize, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|p| p.user_id == user_id && p.course_id == course_id)
            .count())
    }

    /// Drop the held session as the hosted service does when a token can no
    /// longer be refreshed. Registered session-lost hooks run afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn revoke_session(&self) -> Result<(), StorageError> {
        self.store_session(None)?;
        let hooks: Vec<SessionLostHook> = self
            .lost_hooks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .clone();
        for hook in hooks {
            hook();
        }
        Ok(())
    }

    fn issue_session(&self, user: User) -> Session {
        let now = self.clock.now();
        Session {
            access_token: format!("memory-{}", ProgressId::random()),
            refresh_token: None,
            expires_at: Some(now + chrono::Duration::hours(1)),
            user,
        }
    }

    fn store_session(&self, session: Option<Session>) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = session;
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn list_course_summaries(&self) -> Result<Vec<CourseSummary>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut items: Vec<CourseSummary> = guard.values().map(Course::summary).collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn count_courses(&self) -> Result<u32, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        u32::try_from(guard.len()).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_completed_course_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CourseId>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.course_id)
            .collect())
    }

    async fn find_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .find(|p| p.user_id == user_id && p.course_id == course_id)
            .cloned())
    }

    async fn insert_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard
            .iter()
            .any(|p| p.user_id == user_id && p.course_id == course_id)
        {
            return Err(StorageError::Conflict);
        }
        let now = self.clock.now();
        let record = ProgressRecord {
            id: ProgressId::random(),
            user_id,
            course_id,
            completed_at: now,
            created_at: now,
        };
        guard.push(record.clone());
        Ok(record)
    }

    async fn list_completed_courses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedCourse>, StorageError> {
        let mut records: Vec<ProgressRecord> = {
            let guard = self
                .progress
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.iter().filter(|p| p.user_id == user_id).cloned().collect()
        };
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let courses = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        // Rows whose course vanished are skipped, like an inner join would.
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let course = courses.get(&record.course_id)?;
                Some(CompletedCourse {
                    progress_id: record.id,
                    completed_at: record.completed_at,
                    course: CompletedCourseInfo {
                        id: course.id,
                        title: course.title.clone(),
                        thumbnail_url: course.thumbnail_url.clone(),
                        duration: course.duration.clone(),
                    },
                })
            })
            .collect())
    }
}

#[async_trait]
impl AuthProvider for InMemoryRepository {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StorageError> {
        let account = {
            let guard = self
                .accounts
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(&credentials.email().to_lowercase()).cloned()
        };
        let user = match account {
            Some(account) if account.password == credentials.password() => account.user,
            _ => {
                return Err(StorageError::Unauthorized(
                    "Invalid login credentials".to_string(),
                ));
            }
        };
        let session = self.issue_session(user);
        self.store_session(Some(session.clone()))?;
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, StorageError> {
        let user = self.register(credentials).map_err(|err| match err {
            StorageError::Conflict => {
                StorageError::Unauthorized("User already registered".to_string())
            }
            other => other,
        })?;
        if self.require_confirmation {
            return Ok(None);
        }
        let session = self.issue_session(user);
        self.store_session(Some(session.clone()))?;
        Ok(Some(session))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), StorageError> {
        self.store_session(None)
    }

    async fn current_session(&self) -> Result<Option<Session>, StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.as_ref().is_some_and(|s| s.is_expired(&self.clock)) {
            *guard = None;
        }
        Ok(guard.clone())
    }

    fn on_session_lost(&self, hook: SessionLostHook) {
        match self.lost_hooks.lock() {
            Ok(mut hooks) => hooks.push(hook),
            Err(poisoned) => poisoned.into_inner().push(hook),
        }
    }
}

/// Aggregates backend contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one in-memory repository across all three contracts.
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let auth: Arc<dyn AuthProvider> = Arc::new(repo);
        Self {
            courses,
            progress,
            auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use learnly_core::time::{fixed_clock, fixed_now};

    fn build_course(title: &str, age_days: i64) -> Course {
        let created = fixed_now() - Duration::days(age_days);
        Course {
            id: CourseId::random(),
            title: title.to_string(),
            short_description: format!("{title} in brief"),
            full_description: format!("{title} in depth"),
            learning_objectives: vec!["Understand".into()],
            duration: "2 hours".into(),
            instructor_name: "Grace".into(),
            instructor_bio: "Teaches things".into(),
            thumbnail_url: "https://example.com/t.png".into(),
            created_at: created,
            updated_at: created,
        }
    }

    fn creds() -> Credentials {
        Credentials::new("ada@example.com", "hunter22").unwrap()
    }

    #[tokio::test]
    async fn lists_courses_newest_first() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        repo.put_course(build_course("old", 10)).unwrap();
        repo.put_course(build_course("new", 1)).unwrap();
        repo.put_course(build_course("mid", 5)).unwrap();

        let titles: Vec<_> = repo
            .list_course_summaries()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["new", "mid", "old"]);
        assert_eq!(repo.count_courses().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn duplicate_progress_is_a_conflict() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let course = build_course("c", 1);
        repo.put_course(course.clone()).unwrap();
        let user = UserId::random();

        let record = repo.insert_progress(user, course.id).await.unwrap();
        assert_eq!(record.completed_at, fixed_now());

        let err = repo.insert_progress(user, course.id).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(repo.progress_count(user, course.id).unwrap(), 1);
    }

    #[tokio::test]
    async fn completed_courses_join_course_fields() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let course = build_course("Joined", 1);
        repo.put_course(course.clone()).unwrap();
        let user = UserId::random();
        repo.insert_progress(user, course.id).await.unwrap();
        repo.insert_progress(UserId::random(), course.id)
            .await
            .unwrap();

        let completed = repo.list_completed_courses(user).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].course.title, "Joined");
        assert_eq!(completed[0].course.id, course.id);
    }

    #[tokio::test]
    async fn completed_courses_are_most_recent_first() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let user = UserId::random();
        // Inserted out of order: middle, oldest, newest.
        for (title, hours_ago) in [("middle", 5), ("oldest", 9), ("newest", 1)] {
            let course = build_course(title, 30);
            repo.put_course(course.clone()).unwrap();
            let at = fixed_now() - Duration::hours(hours_ago);
            repo.reclocked(Clock::fixed(at))
                .insert_progress(user, course.id)
                .await
                .unwrap();
        }

        let completed = repo.list_completed_courses(user).await.unwrap();
        let titles: Vec<_> = completed.iter().map(|c| c.course.title.as_str()).collect();
        assert_eq!(titles, ["newest", "middle", "oldest"]);
        assert_eq!(completed[0].completed_at, fixed_now() - Duration::hours(1));
        assert!(completed.windows(2).all(|w| w[0].completed_at > w[1].completed_at));
    }

    #[tokio::test]
    async fn revoking_session_runs_lost_hooks() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        repo.register(&creds()).unwrap();
        repo.sign_in(&creds()).await.unwrap();

        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        repo.on_session_lost(Arc::new(move || *counter.lock().unwrap() += 1));

        repo.revoke_session().unwrap();
        assert!(repo.current_session().await.unwrap().is_none());
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn sign_in_checks_password_and_persists_session() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        repo.register(&creds()).unwrap();

        let wrong = Credentials::new("ada@example.com", "wrong-pass").unwrap();
        let err = repo.sign_in(&wrong).await.unwrap_err();
        assert!(matches!(err, StorageError::Unauthorized(_)));
        assert!(repo.current_session().await.unwrap().is_none());

        let session = repo.sign_in(&creds()).await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(repo.current_session().await.unwrap(), Some(session.clone()));

        repo.sign_out(&session).await.unwrap();
        assert!(repo.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_up_twice_is_rejected() {
        let repo = InMemoryRepository::new();
        assert!(repo.sign_up(&creds()).await.unwrap().is_some());
        let err = repo.sign_up(&creds()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unauthorized(msg) if msg.contains("already")));
    }

    #[tokio::test]
    async fn confirmation_mode_issues_no_session() {
        let repo = InMemoryRepository::new().requiring_confirmation();
        assert!(repo.sign_up(&creds()).await.unwrap().is_none());
        assert!(repo.current_session().await.unwrap().is_none());
        assert!(repo.sign_in(&creds()).await.is_ok());
    }
}
