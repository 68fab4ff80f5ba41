use std::sync::Arc;

use storage::seed::seed_demo;
use storage::{BackendConfig, InMemoryRepository, RemoteBackend, SessionStore, Storage};

use crate::catalog_service::CourseCatalogService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::session_holder::SessionHolder;
use crate::Clock;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    session: SessionHolder,
    catalog: Arc<CourseCatalogService>,
    progress: Arc<ProgressService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        let session = SessionHolder::new(Arc::clone(&storage.auth));
        let catalog = Arc::new(CourseCatalogService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
        ));
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.progress)));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
        ));

        Self {
            session,
            catalog,
            progress,
            dashboard,
        }
    }

    /// Services backed by the hosted backend, persisting the session in `sessions`.
    #[must_use]
    pub fn remote(config: BackendConfig, sessions: Arc<dyn SessionStore>, clock: Clock) -> Self {
        let backend = RemoteBackend::new(config, sessions, clock);
        tracing::info!(url = %backend.config().url(), "using hosted backend");
        Self::from_storage(&Storage::remote(backend))
    }

    /// Services backed by an in-memory store holding the sample catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding the store fails.
    pub fn demo(clock: Clock) -> Result<Self, AppServicesError> {
        let repo = InMemoryRepository::with_clock(clock);
        seed_demo(&repo, clock.now())?;
        tracing::info!("using in-memory demo backend");
        Ok(Self::from_storage(&Storage::from_repository(repo)))
    }

    #[must_use]
    pub fn session(&self) -> SessionHolder {
        self.session.clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CourseCatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
