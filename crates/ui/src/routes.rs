use chrono::{Datelike, Utc};
use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_route};
use learnly_core::model::CourseId;

use crate::context::AppContext;
use crate::views::{CourseDetailsView, CoursesView, DashboardView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", CoursesView)] Courses {},
        #[route("/courses/:course_id", CourseDetailsView)] CourseDetails { course_id: CourseId },
        #[route("/dashboard", DashboardView)] Dashboard {},
}

#[component]
fn Layout() -> Element {
    let route = use_route::<Route>();
    let show_header = !matches!(route, Route::CourseDetails { .. });

    rsx! {
        div { class: "app",
            if show_header {
                Header { active: route.clone() }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
            Footer {}
        }
    }
}

#[component]
fn Header(active: Route) -> Element {
    let ctx = use_context::<AppContext>();
    let holder = ctx.session();

    let nav_class = |selected: bool| {
        if selected { "nav-link nav-link--active" } else { "nav-link" }
    };
    let courses_class = nav_class(matches!(active, Route::Courses {}));
    let dashboard_class = nav_class(matches!(active, Route::Dashboard {}));

    let on_sign_out = move |_| {
        let holder = holder.clone();
        spawn(async move {
            if let Err(err) = holder.sign_out().await {
                tracing::error!(error = %err, "sign-out failed");
            }
        });
    };

    rsx! {
        header { class: "header",
            div { class: "brand",
                span { class: "brand-mark", "L" }
                h1 { "Learnly" }
            }
            nav {
                Link { class: courses_class, to: Route::Courses {}, "Courses" }
                Link { class: dashboard_class, to: Route::Dashboard {}, "Dashboard" }
                button {
                    class: "nav-link nav-link--danger",
                    r#type: "button",
                    onclick: on_sign_out,
                    "Sign Out"
                }
            }
        }
    }
}

#[component]
pub fn Footer() -> Element {
    let year = Utc::now().year();

    rsx! {
        footer { class: "footer",
            div { class: "footer-brand",
                h3 { "Learnly" }
                p { "Empowering learners worldwide with quality education and accessible courses." }
            }
            p { class: "footer-legal", "© {year} Learnly. All rights reserved." }
        }
    }
}
