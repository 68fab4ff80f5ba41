use dioxus::prelude::*;
use services::SignUpOutcome;

use crate::context::AppContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthMode {
    Login,
    SignUp,
}

/// Signed-out landing: the login form, toggleable to the sign-up form.
#[component]
pub fn AuthView() -> Element {
    let mut mode = use_signal(|| AuthMode::Login);

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                div { class: "brand",
                    span { class: "brand-mark", "L" }
                    h1 { "Learnly" }
                }
                match mode() {
                    AuthMode::Login => rsx! {
                        LoginForm { on_toggle: move |_| mode.set(AuthMode::SignUp) }
                    },
                    AuthMode::SignUp => rsx! {
                        SignUpForm { on_toggle: move |_| mode.set(AuthMode::Login) }
                    },
                }
            }
        }
    }
}

#[component]
fn LoginForm(on_toggle: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let holder = ctx.session();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let holder = holder.clone();
        let email = email();
        let password = password();
        submitting.set(true);
        error.set(None);
        spawn(async move {
            if let Err(err) = holder.sign_in(&email, &password).await {
                error.set(Some(err.to_string()));
            }
            submitting.set(false);
        });
    };

    rsx! {
        h2 { "Welcome back" }
        p { class: "auth-subtitle", "Sign in to continue learning" }

        if let Some(message) = error() {
            p { class: "form-error", role: "alert", "{message}" }
        }

        form { class: "auth-form", onsubmit: on_submit,
            label { r#for: "login-email", "Email" }
            input {
                id: "login-email",
                r#type: "email",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            label { r#for: "login-password", "Password" }
            input {
                id: "login-password",
                r#type: "password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            button {
                class: "btn btn-primary btn-block",
                r#type: "submit",
                disabled: submitting(),
                if submitting() { "Signing in..." } else { "Sign In" }
            }
        }

        p { class: "auth-toggle",
            "Don't have an account? "
            button {
                class: "link",
                r#type: "button",
                onclick: move |_| on_toggle.call(()),
                "Sign up"
            }
        }
    }
}

#[component]
fn SignUpForm(on_toggle: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let holder = ctx.session();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut pending_confirmation = use_signal(|| false);
    let mut submitting = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        if password() != confirm() {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }
        let holder = holder.clone();
        let email = email();
        let password = password();
        submitting.set(true);
        error.set(None);
        spawn(async move {
            match holder.sign_up(&email, &password).await {
                Ok(SignUpOutcome::SignedIn(_)) => {}
                Ok(SignUpOutcome::ConfirmationRequired) => pending_confirmation.set(true),
                Err(err) => error.set(Some(err.to_string())),
            }
            submitting.set(false);
        });
    };

    rsx! {
        h2 { "Create your account" }
        p { class: "auth-subtitle", "Start tracking your learning progress" }

        if pending_confirmation() {
            p { class: "form-notice",
                "Check your email to confirm your account, then sign in."
            }
        }
        if let Some(message) = error() {
            p { class: "form-error", role: "alert", "{message}" }
        }

        form { class: "auth-form", onsubmit: on_submit,
            label { r#for: "signup-email", "Email" }
            input {
                id: "signup-email",
                r#type: "email",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            label { r#for: "signup-password", "Password" }
            input {
                id: "signup-password",
                r#type: "password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }
            label { r#for: "signup-confirm", "Confirm Password" }
            input {
                id: "signup-confirm",
                r#type: "password",
                value: "{confirm}",
                oninput: move |evt| confirm.set(evt.value()),
            }
            button {
                class: "btn btn-primary btn-block",
                r#type: "submit",
                disabled: submitting(),
                if submitting() { "Creating account..." } else { "Sign Up" }
            }
        }

        p { class: "auth-toggle",
            "Already have an account? "
            button {
                class: "link",
                r#type: "button",
                onclick: move |_| on_toggle.call(()),
                "Sign in"
            }
        }
    }
}
