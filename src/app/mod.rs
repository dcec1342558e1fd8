//! The application backend: state, commands, events and the classify workflow.

pub mod commands;
pub mod events;
pub mod file_dialog;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;

use std::sync::{Arc, Mutex};

use events::{IpcMessage, UserEvent};
use file_dialog::DialogService;
use proxy::EventProxy;
use state::UploadState;

use crate::client::HttpClassifier;

/// Builds the production classifier from the currently configured base URL,
/// so config changes apply to the very next submission.
fn http_classifier(state: &Arc<Mutex<UploadState>>) -> Arc<HttpClassifier> {
    let base_url = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.config.base_url.clone()
    };
    Arc::new(HttpClassifier::new(base_url))
}

/// Entry point for files dropped onto the window: same workflow as a
/// `submitFile` IPC command.
pub fn submit_dropped_file<P: EventProxy>(
    path: std::path::PathBuf,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) {
    let classifier = http_classifier(&state);
    tasks::start_classification(path, classifier, proxy, state);
}

/// Dispatches one raw IPC message from the webview to its command handler.
pub fn handle_ipc_message<P: EventProxy>(
    message: String,
    dialog: Arc<dyn DialogService>,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) {
    let msg: IpcMessage = match serde_json::from_str(&message) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Failed to parse IPC message '{}': {}", message, e);
            return;
        }
    };

    tracing::debug!("IPC command received: {}", msg.command);
    match msg.command.as_str() {
        "initialize" => commands::initialize(proxy, state),
        "submitFile" => {
            let classifier = http_classifier(&state);
            commands::submit_file(msg.payload, classifier, proxy, state);
        }
        "pickImage" => {
            let classifier = http_classifier(&state);
            commands::pick_image(dialog.as_ref(), classifier, proxy, state);
        }
        "reset" => commands::reset(proxy, state),
        "updateConfig" => commands::update_config(msg.payload, proxy, state),
        other => tracing::warn!("Unknown IPC command: {}", other),
    }
}

/// Forwards a backend event to the webview by calling the matching
/// `window.*` function in the frontend.
pub fn handle_user_event(event: UserEvent, webview: &wry::WebView) {
    match event {
        UserEvent::StateUpdate(ui_state) => match serde_json::to_string(&*ui_state) {
            Ok(json) => {
                if let Err(e) = webview.evaluate_script(&format!("window.render({json})")) {
                    tracing::error!("Failed to push state to the webview: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize UI state: {}", e),
        },
        UserEvent::DragStateChanged(active) => {
            if let Err(e) = webview.evaluate_script(&format!("window.setDragState({active})")) {
                tracing::error!("Failed to push drag state to the webview: {}", e);
            }
        }
    }
}
