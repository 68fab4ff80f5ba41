#![forbid(unsafe_code)]

pub mod remote;
pub mod repository;
pub mod seed;
pub mod session_store;

pub use remote::{BackendConfig, ConfigError, RemoteBackend};
pub use repository::{
    AuthProvider, CourseRepository, InMemoryRepository, ProgressRepository, SessionLostHook,
    Storage, StorageError,
};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
