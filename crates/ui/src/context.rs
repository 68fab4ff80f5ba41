use std::sync::Arc;

use services::{AppServices, CourseCatalogService, DashboardService, ProgressService, SessionHolder};

pub trait UiApp: Send + Sync {
    fn session(&self) -> SessionHolder;
    fn catalog(&self) -> Arc<CourseCatalogService>;
    fn progress(&self) -> Arc<ProgressService>;
    fn dashboard(&self) -> Arc<DashboardService>;
}

impl UiApp for AppServices {
    fn session(&self) -> SessionHolder {
        AppServices::session(self)
    }

    fn catalog(&self) -> Arc<CourseCatalogService> {
        AppServices::catalog(self)
    }

    fn progress(&self) -> Arc<ProgressService> {
        AppServices::progress(self)
    }

    fn dashboard(&self) -> Arc<DashboardService> {
        AppServices::dashboard(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    session: SessionHolder,
    catalog: Arc<CourseCatalogService>,
    progress: Arc<ProgressService>,
    dashboard: Arc<DashboardService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            session: app.session(),
            catalog: app.catalog(),
            progress: app.progress(),
            dashboard: app.dashboard(),
        }
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

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
