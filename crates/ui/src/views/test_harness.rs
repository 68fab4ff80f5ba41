use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use learnly_core::model::{CourseId, Credentials, User};
use services::AppServices;
use storage::{InMemoryRepository, Storage};

use crate::app::AuthGate;
use crate::context::{UiApp, build_app_context};
use crate::views::course_details::CourseDetailTestHandles;
use crate::views::{AuthView, CourseDetailsView, CoursesView, DashboardView};

pub const TEST_EMAIL: &str = "ada@example.com";
pub const TEST_PASSWORD: &str = "hunter22";

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Courses,
    CourseDetails(CourseId),
    Dashboard,
    Auth,
    Gate,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<AppServices>,
    view: ViewKind,
    detail_handles: Option<CourseDetailTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    let ctx = use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.detail_handles.clone() {
        use_context_provider(|| handles);
    }

    if props.view == ViewKind::Gate {
        return rsx! { AuthGate {} };
    }

    let holder = ctx.session();
    let auth = use_signal(move || holder.snapshot());
    use_context_provider(|| auth);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Courses => rsx! { CoursesView {} },
        ViewKind::CourseDetails(course_id) => rsx! { CourseDetailsView { course_id } },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Auth | ViewKind::Gate => rsx! { AuthView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: Arc<AppServices>,
    pub user: Option<User>,
    pub detail_handles: Option<CourseDetailTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned fetches and their re-renders run to completion.
    pub async fn settle(&mut self) {
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn mark_complete(&mut self) {
        let callback = self
            .detail_handles
            .as_ref()
            .expect("detail handles installed")
            .mark_complete();
        self.dom.in_runtime(|| callback.call(()));
        drive_dom(&mut self.dom);
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Register the test account in `repo` without signing it in.
pub fn register_test_user(repo: &InMemoryRepository) {
    let credentials = Credentials::new(TEST_EMAIL, TEST_PASSWORD).expect("valid credentials");
    repo.register(&credentials).expect("register test user");
}

/// Build a harness over `storage`. With `signed_in`, the session holder is
/// initialized and signed in before the first render.
pub async fn setup_view_harness(view: ViewKind, storage: Storage, signed_in: bool) -> ViewHarness {
    let services = Arc::new(AppServices::from_storage(&storage));

    let user = if signed_in {
        let holder = services.session();
        holder.initialize().await;
        Some(
            holder
                .sign_in(TEST_EMAIL, TEST_PASSWORD)
                .await
                .expect("sign in test user"),
        )
    } else if view == ViewKind::Gate {
        None
    } else {
        services.session().initialize().await;
        None
    };

    let detail_handles = match view {
        ViewKind::CourseDetails(_) => Some(CourseDetailTestHandles::default()),
        _ => None,
    };

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::clone(&services),
            view,
            detail_handles: detail_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        services,
        user,
        detail_handles,
    }
}
