use dioxus::prelude::*;
use dioxus_router::Link;
use learnly_core::model::CourseId;
use services::{AuthSnapshot, CourseLookup};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::CourseDetailVm;

const MARK_COMPLETE_FAILED: &str = "Failed to mark course as complete. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
enum DetailData {
    Found { course: CourseDetailVm, completed: bool },
    NotFound,
}

#[component]
pub fn CourseDetailsView(course_id: CourseId) -> Element {
    let ctx = use_context::<AppContext>();
    let auth = use_context::<Signal<AuthSnapshot>>();
    let catalog = ctx.catalog();
    let progress = ctx.progress();

    let mut marked_complete = use_signal(|| false);
    let mut marking = use_signal(|| false);
    let mut show_failure = use_signal(|| false);

    let resource = use_resource(move || {
        let catalog = catalog.clone();
        let user = auth.read().user.clone();
        async move {
            match catalog.course_detail(course_id, user.as_ref()).await {
                CourseLookup::Found(detail) => DetailData::Found {
                    course: CourseDetailVm::from(&detail.course),
                    completed: detail.completed,
                },
                CourseLookup::NotFound => DetailData::NotFound,
            }
        }
    });

    let mark_complete = use_callback(move |()| {
        if marking() {
            return;
        }
        let fetched_completed = matches!(
            resource.read().as_ref(),
            Some(DetailData::Found { completed: true, .. })
        );
        let already_completed = fetched_completed || marked_complete();
        let progress = progress.clone();
        let user = auth.read().user.clone();
        marking.set(true);
        spawn(async move {
            match progress
                .mark_complete(user.as_ref(), course_id, already_completed)
                .await
            {
                Ok(outcome) => {
                    if outcome.is_completed() {
                        marked_complete.set(true);
                    }
                }
                Err(_) => show_failure.set(true),
            }
            marking.set(false);
        });
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<CourseDetailTestHandles>() {
                handles.register(mark_complete);
            }
        }
    }

    let state = view_state_from_resource(&resource);
    let signed_in = auth.read().user.is_some();

    let (course, fetched_completed) = match state {
        ViewState::Idle | ViewState::Loading => {
            return rsx! {
                div { class: "page page--centered",
                    p { class: "spinner", "Loading..." }
                }
            };
        }
        ViewState::Ready(DetailData::NotFound) => {
            return rsx! {
                div { class: "page page--centered",
                    h2 { "Course not found" }
                    Link { class: "link", to: Route::Courses {}, "Go back to courses" }
                }
            };
        }
        ViewState::Ready(DetailData::Found { course, completed }) => (course, completed),
    };
    let completed = fetched_completed || marked_complete();
    let objectives = course.learning_objectives.clone();

    rsx! {
        div { class: "page course-detail",
            Link { class: "back-link", to: Route::Courses {}, "Back to Courses" }

            article { class: "course-detail__card",
                div { class: "course-detail__media",
                    img { src: "{course.thumbnail_url}", alt: "{course.title}" }
                    if completed {
                        span { class: "badge badge--completed", "Completed" }
                    }
                }

                div { class: "course-detail__body",
                    h1 { "{course.title}" }
                    div { class: "course-detail__meta",
                        span { class: "duration", "{course.duration}" }
                        span { class: "instructor", "{course.instructor_name}" }
                    }

                    section {
                        h2 { "About This Course" }
                        p { "{course.full_description}" }
                    }

                    section {
                        h2 { "Learning Objectives" }
                        ul { class: "objectives",
                            for (index, objective) in objectives.iter().enumerate() {
                                li { key: "{index}", "{objective}" }
                            }
                        }
                    }

                    section { class: "instructor-card",
                        div { class: "instructor-card__avatar", "{course.instructor_initial}" }
                        div {
                            h3 { "Instructor: {course.instructor_name}" }
                            p { "{course.instructor_bio}" }
                        }
                    }

                    if signed_in && !completed {
                        button {
                            class: "btn btn-success btn-block",
                            r#type: "button",
                            disabled: marking(),
                            onclick: move |_| mark_complete.call(()),
                            if marking() { "Marking as Complete..." } else { "Mark as Completed" }
                        }
                    }
                    if !signed_in {
                        div { class: "notice",
                            p { "Sign in to track your progress and mark courses as completed" }
                        }
                    }
                }
            }

            if show_failure() {
                div { class: "modal-overlay",
                    div {
                        class: "modal",
                        role: "alertdialog",
                        aria_modal: "true",
                        p { class: "modal-body", "{MARK_COMPLETE_FAILED}" }
                        div { class: "modal-actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| show_failure.set(false),
                                "OK"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CourseDetailTestHandles {
    mark_complete: std::rc::Rc<std::cell::RefCell<Option<Callback<()>>>>,
}

#[cfg(test)]
impl CourseDetailTestHandles {
    pub(crate) fn register(&self, mark_complete: Callback<()>) {
        *self.mark_complete.borrow_mut() = Some(mark_complete);
    }

    pub(crate) fn mark_complete(&self) -> Callback<()> {
        (*self.mark_complete.borrow()).expect("mark-complete callback registered")
    }
}
