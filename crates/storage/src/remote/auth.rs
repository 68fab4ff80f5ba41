use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use learnly_core::model::{Credentials, Session, User, UserId};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{RemoteBackend, transport};
use crate::repository::{AuthProvider, SessionLostHook, StorageError};

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        Self {
            id: payload.id,
            email: payload.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        Session {
            user: self.user.into(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Sign-up answers with a session, or with the bare user while the email
/// address awaits confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(UserPayload),
}

#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

fn auth_error(status: StatusCode, body: &str) -> StorageError {
    let message = serde_json::from_str::<AuthErrorBody>(body)
        .ok()
        .and_then(AuthErrorBody::into_message)
        .unwrap_or_else(|| body.trim().to_string());
    if status.is_client_error() {
        StorageError::Unauthorized(message)
    } else {
        StorageError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

impl RemoteBackend {
    async fn auth_post<B: Serialize + Sync, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StorageError> {
        let url = self.config.endpoint(path)?;
        let response = self
            .client
            .request(Method::POST, url)
            .header("apikey", &self.config.anon_key)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(auth_error(status, &text));
        }
        response.json().await.map_err(transport)
    }

    /// Persist `session`, then send its token. A failed save changes nothing.
    fn remember(&self, session: &Session) -> Result<(), StorageError> {
        self.sessions.save(session)?;
        self.set_session(Some(session.clone()));
        Ok(())
    }

    fn forget(&self) -> Result<(), StorageError> {
        self.sessions.clear()?;
        self.set_session(None);
        Ok(())
    }

    /// Discard a session that can no longer be renewed and tell the hooks.
    fn lose_session(&self) {
        self.set_session(None);
        if let Err(err) = self.sessions.clear() {
            tracing::warn!(error = %err, "could not clear persisted session");
        }
        tracing::info!("session expired; continuing signed out");
        let hooks: Vec<SessionLostHook> = match self.lost_hooks.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for hook in hooks {
            hook();
        }
    }

    /// Renew an expired session before a table request. Without a refresh
    /// token, or when the auth service rejects it, the session is dropped and
    /// the request goes out with the anon key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the refresh cannot reach the auth service or
    /// the renewed session cannot be persisted; the expired session is kept.
    pub(super) async fn ensure_fresh_session(&self) -> Result<(), StorageError> {
        if !self.held_session_expired() {
            return Ok(());
        }
        let _gate = self.refresh_gate.lock().await;
        // Another request may have renewed or dropped it while we waited.
        let Some(session) = self.held_session() else {
            return Ok(());
        };
        if !session.is_expired(&self.clock) {
            return Ok(());
        }
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            self.lose_session();
            return Ok(());
        };
        match self.refresh(refresh_token).await {
            Ok(renewed) => {
                tracing::debug!(user = %renewed.user.id, "session refreshed");
                Ok(())
            }
            Err(StorageError::Unauthorized(reason)) => {
                tracing::info!(%reason, "session refresh rejected");
                self.lose_session();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, StorageError> {
        let grant = RefreshGrant { refresh_token };
        let token: TokenResponse = self
            .auth_post("auth/v1/token?grant_type=refresh_token", &grant)
            .await?;
        let session = token.into_session(self.clock.now());
        self.remember(&session)?;
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for RemoteBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StorageError> {
        let grant = PasswordGrant {
            email: credentials.email(),
            password: credentials.password(),
        };
        let token: TokenResponse = self
            .auth_post("auth/v1/token?grant_type=password", &grant)
            .await?;
        let session = token.into_session(self.clock.now());
        self.remember(&session)?;
        tracing::info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>, StorageError> {
        let grant = PasswordGrant {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: SignUpResponse = self.auth_post("auth/v1/signup", &grant).await?;
        match response {
            SignUpResponse::Session(token) => {
                let session = token.into_session(self.clock.now());
                self.remember(&session)?;
                tracing::info!(user = %session.user.id, "signed up");
                Ok(Some(session))
            }
            SignUpResponse::Pending(user) => {
                tracing::info!(user = %user.id, "sign-up awaiting email confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self, session: &Session) -> Result<(), StorageError> {
        let url = self.config.endpoint("auth/v1/logout")?;
        let response = self
            .client
            .request(Method::POST, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        // An already-revoked token still counts as signed out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return self.forget();
        }
        let text = response.text().await.unwrap_or_default();
        Err(auth_error(status, &text))
    }

    async fn current_session(&self) -> Result<Option<Session>, StorageError> {
        let Some(stored) = self.sessions.load()? else {
            return Ok(None);
        };
        if !stored.is_expired(&self.clock) {
            self.set_session(Some(stored.clone()));
            return Ok(Some(stored));
        }

        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            self.forget()?;
            return Ok(None);
        };
        match self.refresh(refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(StorageError::Unauthorized(reason)) => {
                tracing::info!(%reason, "stored session could not be refreshed");
                self.forget()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn on_session_lost(&self, hook: SessionLostHook) {
        match self.lost_hooks.write() {
            Ok(mut hooks) => hooks.push(hook),
            Err(poisoned) => poisoned.into_inner().push(hook),
        }
    }
}
