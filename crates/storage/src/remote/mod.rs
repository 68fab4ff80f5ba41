//! Hosted backend adapter: table API under `rest/v1`, auth API under `auth/v1`.

use std::env;
use std::sync::{Arc, RwLock};

use futures::lock::Mutex as AsyncMutex;
use learnly_core::Clock;
use learnly_core::model::Session;
use reqwest::header::{CONTENT_RANGE, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::repository::{
    AuthProvider, CourseRepository, ProgressRepository, SessionLostHook, Storage, StorageError,
};
use crate::session_store::SessionStore;

mod auth;
mod courses;
mod progress;
pub mod query;
mod rows;

use query::{TableQuery, parse_content_range_total, table_path};
use rows::{ApiErrorBody, UNIQUE_VIOLATION};

pub const BACKEND_URL_VAR: &str = "LEARNLY_BACKEND_URL";
pub const ANON_KEY_VAR: &str = "LEARNLY_ANON_KEY";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid backend url {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where the hosted backend lives and the public key used to reach it.
#[derive(Clone)]
pub struct BackendConfig {
    url: Url,
    anon_key: String,
}

impl BackendConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `url` does not parse, or
    /// `ConfigError::Missing` if the key is blank.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(ConfigError::Missing(ANON_KEY_VAR));
        }
        let raw = url.trim();
        // `Url::join` replaces the last segment unless the base ends in `/`.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
            raw: raw.to_string(),
            source,
        })?;
        Ok(Self { url, anon_key })
    }

    /// Read `LEARNLY_BACKEND_URL` and `LEARNLY_ANON_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var(BACKEND_URL_VAR).map_err(|_| ConfigError::Missing(BACKEND_URL_VAR))?;
        let key = env::var(ANON_KEY_VAR).map_err(|_| ConfigError::Missing(ANON_KEY_VAR))?;
        Self::new(&url, key)
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorageError> {
        self.url
            .join(path)
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// Client for the hosted backend. Cheap to clone; clones share the signed-in session.
#[derive(Clone)]
pub struct RemoteBackend {
    client: Client,
    config: BackendConfig,
    clock: Clock,
    sessions: Arc<dyn SessionStore>,
    session: Arc<RwLock<Option<Session>>>,
    // Held across a token refresh so concurrent requests renew once.
    refresh_gate: Arc<AsyncMutex<()>>,
    lost_hooks: Arc<RwLock<Vec<SessionLostHook>>>,
}

impl RemoteBackend {
    #[must_use]
    pub fn new(config: BackendConfig, sessions: Arc<dyn SessionStore>, clock: Clock) -> Self {
        Self {
            client: Client::new(),
            config,
            clock,
            sessions,
            session: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(AsyncMutex::new(())),
            lost_hooks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn set_session(&self, session: Option<Session>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    fn held_session(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Signed-in requests carry the user's token; anonymous ones the anon key.
    fn bearer(&self) -> String {
        self.held_session()
            .map_or_else(|| self.config.anon_key.clone(), |s| s.access_token)
    }

    fn held_session_expired(&self) -> bool {
        self.held_session()
            .is_some_and(|session| session.is_expired(&self.clock))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn select<T: DeserializeOwned>(
        &self,
        query: &TableQuery,
    ) -> Result<Vec<T>, StorageError> {
        self.ensure_fresh_session().await?;
        let url = self.config.endpoint(&query.path())?;
        tracing::debug!(table = query.table(), "select");
        let response = self
            .request(Method::GET, url)
            .query(query.params())
            .send()
            .await
            .map_err(transport)?;
        let response = check_table_response(response).await?;
        response.json().await.map_err(transport)
    }

    async fn count(&self, query: &TableQuery) -> Result<u32, StorageError> {
        self.ensure_fresh_session().await?;
        let url = self.config.endpoint(&query.path())?;
        tracing::debug!(table = query.table(), "count");
        let response = self
            .request(Method::HEAD, url)
            .query(query.params())
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(transport)?;
        let response = check_table_response(response).await?;
        count_from_headers(response.headers())
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &'static str,
        body: &B,
    ) -> Result<Vec<T>, StorageError> {
        self.ensure_fresh_session().await?;
        let url = self.config.endpoint(&table_path(table))?;
        tracing::debug!(table, "insert");
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let response = check_table_response(response).await?;
        response.json().await.map_err(transport)
    }
}

impl Storage {
    /// Route every contract through one hosted backend client.
    #[must_use]
    pub fn remote(backend: RemoteBackend) -> Self {
        let courses: Arc<dyn CourseRepository> = Arc::new(backend.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(backend.clone());
        let auth: Arc<dyn AuthProvider> = Arc::new(backend);
        Self {
            courses,
            progress,
            auth,
        }
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    if err.is_decode() {
        StorageError::Serialization(err.to_string())
    } else {
        StorageError::Connection(err.to_string())
    }
}

fn count_from_headers(headers: &HeaderMap) -> Result<u32, StorageError> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
        .ok_or_else(|| StorageError::Serialization("missing row count in Content-Range".into()))
}

async fn check_table_response(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(table_error(status, &body))
}

fn table_error(status: StatusCode, body: &str) -> StorageError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let conflict = match parsed.code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => status == StatusCode::CONFLICT,
    };
    if conflict {
        return StorageError::Conflict;
    }
    let message = parsed.message.unwrap_or_else(|| body.trim().to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized(message),
        StatusCode::NOT_FOUND => StorageError::NotFound,
        _ => StorageError::Http {
            status: status.as_u16(),
            message,
        },
    }
}
