use dioxus::prelude::*;

/// Render state of a page-level fetch. Reads never fail outright: services
/// degrade to empty data, so there is no error variant.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
}

#[must_use]
pub fn view_state_from_resource<T: Clone + 'static>(resource: &Resource<T>) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(data) => ViewState::Ready(data.clone()),
            None => ViewState::Loading,
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
