//! The single owner of "who is signed in".
//!
//! Views never mutate session state themselves: they read snapshots and
//! subscribe to [`SessionEvent`]s. Subscriptions are guards; dropping one
//! detaches its listener.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use learnly_core::model::{Credentials, Session, User};
use storage::AuthProvider;

use crate::error::AuthError;

/// Point-in-time view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    /// True until the initial session check has resolved.
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The startup check finished; `None` means nobody is signed in.
    InitialSession(Option<User>),
    SignedIn(User),
    SignedOut,
}

impl SessionEvent {
    /// The user that is signed in after this event.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionEvent::InitialSession(user) => user.as_ref(),
            SessionEvent::SignedIn(user) => Some(user),
            SessionEvent::SignedOut => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(User),
    /// The account exists but the email address must be confirmed first.
    ConfirmationRequired,
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct HolderState {
    session: Option<Session>,
    loading: bool,
}

struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<BTreeMap<u64, Listener>>,
}

impl Listeners {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, Listener>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn notify(&self, event: &SessionEvent) {
        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = self.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }
}

fn lock_state(state: &Mutex<HolderState>) -> MutexGuard<'_, HolderState> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// The provider dropped the session behind our back, e.g. an expired token
/// that could not be refreshed.
fn end_lost_session(state: &Mutex<HolderState>, listeners: &Listeners) {
    let lost = lock_state(state).session.take();
    if let Some(session) = lost {
        tracing::info!(user = %session.user.id, "session expired; signed out");
        listeners.notify(&SessionEvent::SignedOut);
    }
}

/// Wraps the auth provider and broadcasts session changes.
#[derive(Clone)]
pub struct SessionHolder {
    auth: Arc<dyn AuthProvider>,
    state: Arc<Mutex<HolderState>>,
    listeners: Arc<Listeners>,
}

impl SessionHolder {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let holder = Self {
            auth,
            state: Arc::new(Mutex::new(HolderState {
                session: None,
                loading: true,
            })),
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(BTreeMap::new()),
            }),
        };
        let state = Arc::downgrade(&holder.state);
        let listeners = Arc::downgrade(&holder.listeners);
        holder.auth.on_session_lost(Arc::new(move || {
            if let (Some(state), Some(listeners)) = (state.upgrade(), listeners.upgrade()) {
                end_lost_session(&state, &listeners);
            }
        }));
        holder
    }

    fn state(&self) -> MutexGuard<'_, HolderState> {
        lock_state(&self.state)
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.state();
        AuthSnapshot {
            user: state.session.as_ref().map(|s| s.user.clone()),
            loading: state.loading,
        }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.snapshot().user
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Rehydrate the persisted session. Runs the check once; later calls
    /// return the current snapshot without touching the backend.
    pub async fn initialize(&self) -> AuthSnapshot {
        if !self.is_loading() {
            return self.snapshot();
        }

        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::error!(error = %err, "session check failed; starting signed out");
                None
            }
        };

        let user = session.as_ref().map(|s| s.user.clone());
        {
            let mut state = self.state();
            if !state.loading {
                // A sign-in finished while the check was in flight; it wins.
                drop(state);
                return self.snapshot();
            }
            state.session = session;
            state.loading = false;
        }
        tracing::info!(signed_in = user.is_some(), "session initialized");
        self.notify(&SessionEvent::InitialSession(user));
        self.snapshot()
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for malformed input, `AuthError::Rejected`
    /// when the service refuses the credentials, or `AuthError::Storage`. The held
    /// session is unchanged on error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::new(email, password)?;
        let session = self.auth.sign_in(&credentials).await?;
        let user = session.user.clone();
        self.replace_session(Some(session));
        self.notify(&SessionEvent::SignedIn(user.clone()));
        Ok(user)
    }

    /// # Errors
    ///
    /// Same as [`SessionHolder::sign_in`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let credentials = Credentials::new(email, password)?;
        match self.auth.sign_up(&credentials).await? {
            Some(session) => {
                let user = session.user.clone();
                self.replace_session(Some(session));
                self.notify(&SessionEvent::SignedIn(user.clone()));
                Ok(SignUpOutcome::SignedIn(user))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    /// Signing out while signed out is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend fails to revoke the session; the user
    /// stays signed in.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.state().session.clone() else {
            return Ok(());
        };
        self.auth.sign_out(&session).await?;
        self.replace_session(None);
        tracing::info!(user = %session.user.id, "signed out");
        self.notify(&SessionEvent::SignedOut);
        Ok(())
    }

    /// Register a listener for session changes. It stays registered until the
    /// returned guard is dropped or [`Subscription::unsubscribe`] is called.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn replace_session(&self, session: Option<Session>) {
        let mut state = self.state();
        state.session = session;
        state.loading = false;
    }

    fn notify(&self, event: &SessionEvent) {
        self.listeners.notify(event);
    }
}

/// Keeps a session listener registered while alive.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Detach the listener now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
