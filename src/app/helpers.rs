//! Lock-mutate-notify plumbing shared by the command handlers.

use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::UploadState;
use super::view_model::generate_ui_state;

/// Locks the shared [`UploadState`], applies `update_fn`, and pushes the
/// resulting view model to the UI in one step. Handlers that change state
/// outside the classify task go through here so no mutation is left
/// unrendered.
pub fn with_state_and_notify<F, P: EventProxy>(
    state: &Arc<Mutex<UploadState>>,
    proxy: &P,
    update_fn: F,
) where
    F: FnOnce(&mut UploadState),
{
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    update_fn(&mut state_guard);

    let ui_state = generate_ui_state(&state_guard);
    proxy.send_event(UserEvent::StateUpdate(Box::new(ui_state)));
}
