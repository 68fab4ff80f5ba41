use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::Router;
use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use services::AuthSnapshot;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::AuthView;

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Learnly" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                AuthGate {}
            }
        }
    }
}

/// Shows the sign-in forms until a user is present, then the routed pages.
///
/// Provides `Signal<AuthSnapshot>` to every view below it. The signal is fed
/// by a session-holder subscription that lives as long as this component.
#[component]
pub fn AuthGate() -> Element {
    let ctx = use_context::<AppContext>();
    let holder = ctx.session();

    let auth = use_signal({
        let holder = holder.clone();
        move || holder.snapshot()
    });
    use_context_provider(|| auth);

    let updates = use_coroutine(move |mut rx: UnboundedReceiver<AuthSnapshot>| {
        let mut auth = auth;
        async move {
            while let Some(snapshot) = rx.next().await {
                auth.set(snapshot);
            }
        }
    });

    // Dropped with the scope, which detaches the listener.
    let _subscription = use_hook({
        let holder = holder.clone();
        move || {
            let tx = updates.tx();
            Rc::new(holder.subscribe(move |event| {
                let snapshot = AuthSnapshot {
                    user: event.user().cloned(),
                    loading: false,
                };
                let _ = tx.unbounded_send(snapshot);
            }))
        }
    });

    use_future(move || {
        let holder = holder.clone();
        let mut auth = auth;
        async move {
            let snapshot = holder.initialize().await;
            auth.set(snapshot);
        }
    });

    let snapshot = auth.read().clone();
    if snapshot.loading {
        return rsx! {
            div { class: "auth-loading",
                p { class: "spinner", "Loading..." }
            }
        };
    }

    match snapshot.user {
        None => rsx! { AuthView {} },
        Some(_) => rsx! { Router::<Route> {} },
    }
}
