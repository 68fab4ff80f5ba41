use dioxus::prelude::*;
use dioxus_router::Link;
use services::AuthSnapshot;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{CompletedCourseCardVm, DashboardVm, map_dashboard};

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let auth = use_context::<Signal<AuthSnapshot>>();
    let dashboard = ctx.dashboard();

    let resource = use_resource(move || {
        let dashboard = dashboard.clone();
        let user = auth.read().user.clone();
        async move {
            let data = dashboard.load(user.as_ref()).await;
            map_dashboard(&data)
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            div { class: "page-heading",
                h2 { "My Dashboard" }
                p { "Track your learning progress and achievements" }
            }

            match state {
                ViewState::Idle => rsx! {},
                ViewState::Loading => rsx! {
                    p { class: "spinner", "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    DashboardBody { vm }
                },
            }
        }
    }
}

#[component]
fn DashboardBody(vm: DashboardVm) -> Element {
    rsx! {
        div { class: "stat-grid",
            StatTile { label: "Total Courses", value: "{vm.total}" }
            StatTile { label: "Completed", value: "{vm.completed_count}" }
            StatTile { label: "Progress", value: "{vm.percentage}%" }
        }

        if vm.celebrate {
            div { class: "celebration",
                h2 { "Congratulations!" }
                p { "You've completed all available courses. Keep up the great work!" }
            }
        }

        section { class: "completed-courses",
            h2 { "Completed Courses" }
            if vm.cards.is_empty() {
                div { class: "empty-state",
                    h3 { "No courses completed yet" }
                    p { "Start exploring courses and track your progress here" }
                }
            } else {
                div { class: "course-grid",
                    for card in vm.cards {
                        CompletedCard { key: "{card.course_id}", card }
                    }
                }
            }
        }
    }
}

#[component]
fn StatTile(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "stat-tile",
            p { class: "stat-tile__label", "{label}" }
            p { class: "stat-tile__value", "{value}" }
        }
    }
}

#[component]
fn CompletedCard(card: CompletedCourseCardVm) -> Element {
    rsx! {
        Link {
            class: "completed-card",
            to: Route::CourseDetails { course_id: card.course_id },
            img { src: "{card.thumbnail_url}", alt: "{card.title}" }
            div { class: "completed-card__body",
                h3 { "{card.title}" }
                p { "Completed on {card.completed_on_str}" }
            }
        }
    }
}
