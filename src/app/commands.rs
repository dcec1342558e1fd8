//! Contains all the command handlers that are callable from the frontend via IPC.
//!
//! Each function in this module corresponds to a specific `IpcMessage::command`.
//! These handlers are responsible for interacting with the `UploadState` and
//! the classify workflow, and for sending `UserEvent`s back to the UI.

use super::events::UserEvent;
use super::file_dialog::DialogService;
use super::helpers::with_state_and_notify;
use super::proxy::EventProxy;
use super::state::UploadState;
use super::tasks::start_classification;
use super::view_model::generate_ui_state;
use crate::client::Classifier;
use crate::config::{self, AppConfig};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Handles the initial request for state from the frontend when it loads.
pub fn initialize<P: EventProxy>(proxy: P, state: Arc<Mutex<UploadState>>) {
    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let event = UserEvent::StateUpdate(Box::new(generate_ui_state(&state_guard)));
    proxy.send_event(event);
}

/// Submits a file for classification. The payload is the path of the dropped
/// or picked file; validation, preview and the network exchange all happen in
/// the spawned task.
pub fn submit_file<P, C>(
    payload: serde_json::Value,
    classifier: Arc<C>,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) where
    P: EventProxy,
    C: Classifier + ?Sized + 'static,
{
    if let Ok(path_str) = serde_json::from_value::<String>(payload.clone()) {
        start_classification(PathBuf::from(path_str), classifier, proxy, state);
    } else {
        tracing::warn!(
            "Failed to deserialize path string from payload: {:?}",
            payload
        );
    }
}

/// Opens the native image dialog and submits the chosen file. Remembers the
/// picked directory for the next dialog.
pub fn pick_image<P, C, D>(
    dialog: &D,
    classifier: Arc<C>,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) where
    P: EventProxy,
    C: Classifier + ?Sized + 'static,
    D: DialogService + ?Sized,
{
    let picked = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        dialog.pick_image(&state_guard.config)
    };

    match picked {
        Some(path) => {
            {
                let mut state_guard = state
                    .lock()
                    .expect("Mutex was poisoned. This should not happen.");
                state_guard.config.last_image_directory =
                    path.parent().map(|p| p.to_path_buf());
                if let Err(e) = config::settings::save_config(
                    &state_guard.config,
                    state_guard.config_dir_override.as_deref(),
                ) {
                    tracing::warn!("Failed to save config after image pick: {}", e);
                }
            }
            start_classification(path, classifier, proxy, state);
        }
        None => {
            tracing::info!("User cancelled image selection.");
        }
    }
}

/// Returns the workflow to `Idle`, clearing the preview, the result and any
/// error. Valid from any state; a still-running classify request is
/// superseded and its outcome dropped when it arrives.
pub fn reset<P: EventProxy>(proxy: P, state: Arc<Mutex<UploadState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.reset();
    });
}

/// Updates the application configuration and persists it. A changed
/// `base_url` takes effect on the next submission.
pub fn update_config<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) {
    if let Ok(new_config) = serde_json::from_value::<AppConfig>(payload.clone()) {
        with_state_and_notify(&state, &proxy, |s| {
            s.config = new_config;
            if let Err(e) =
                config::settings::save_config(&s.config, s.config_dir_override.as_deref())
            {
                tracing::warn!("Failed to save config on update: {}", e);
            }
        });
    } else {
        tracing::warn!(
            "Failed to deserialize AppConfig from payload: {:?}",
            payload
        );
    }
}
