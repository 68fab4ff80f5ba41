use dioxus::prelude::*;
use dioxus_router::Link;
use services::AuthSnapshot;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{CourseCardVm, map_course_cards};

#[component]
pub fn CoursesView() -> Element {
    let ctx = use_context::<AppContext>();
    let auth = use_context::<Signal<AuthSnapshot>>();
    let catalog = ctx.catalog();

    let resource = use_resource(move || {
        let catalog = catalog.clone();
        let user = auth.read().user.clone();
        async move {
            let items = catalog.list_courses(user.as_ref()).await;
            map_course_cards(&items)
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            div { class: "page-heading",
                h2 { "Available Courses" }
                p { "Explore our curated collection of courses and start learning today" }
            }

            match state {
                ViewState::Idle => rsx! {},
                ViewState::Loading => rsx! {
                    p { class: "spinner", "Loading..." }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        div { class: "empty-state",
                            h3 { "No courses available yet" }
                            p { "Check back soon for new learning opportunities" }
                        }
                    } else {
                        div { class: "course-grid",
                            for card in cards {
                                CourseCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn CourseCard(card: CourseCardVm) -> Element {
    rsx! {
        div { class: "course-card",
            div { class: "course-card__media",
                img { src: "{card.thumbnail_url}", alt: "{card.title}" }
                if card.completed {
                    span { class: "badge badge--completed", "Completed" }
                }
            }
            div { class: "course-card__body",
                h3 { "{card.title}" }
                p { class: "course-card__summary", "{card.short_description}" }
                div { class: "course-card__meta",
                    span { "{card.duration}" }
                    span { "Course" }
                }
                Link {
                    class: "btn btn-primary",
                    to: Route::CourseDetails { course_id: card.id },
                    "View Details"
                }
            }
        }
    }
}
