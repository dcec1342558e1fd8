//! The asynchronous classify task driving one submission attempt.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::UploadState;
use super::view_model::generate_ui_state;

use crate::client::Classifier;
use crate::core::preview::ImagePreview;
use crate::core::validation::read_image_upload;

/// Spawns the workflow for one submitted file: validate, decode the preview,
/// send the classify request, apply the outcome.
///
/// Exactly one network request goes out per call that passes validation, and
/// there are no retries. A newer submission (or a reset) supersedes this
/// attempt; the stale task notices via the attempt tag and drops its outcome
/// instead of mutating state. The in-flight transport call itself is never
/// cancelled, which is sufficient per the concurrency model.
pub fn start_classification<P, C>(
    path: PathBuf,
    classifier: Arc<C>,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) where
    P: EventProxy,
    C: Classifier + ?Sized + 'static,
{
    // The tag is claimed here, before the spawn, so submission order decides
    // which attempt is current even when the scheduler runs the spawned
    // tasks in a different order.
    let seq = {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.begin_attempt()
    };

    tokio::spawn(async move {
        classify_task(path, seq, classifier, proxy, state).await;
    });
}

async fn classify_task<P, C>(
    path: PathBuf,
    seq: u64,
    classifier: Arc<C>,
    proxy: P,
    state: Arc<Mutex<UploadState>>,
) where
    P: EventProxy,
    C: Classifier + ?Sized + 'static,
{
    tracing::info!("Submission #{} received: {}", seq, path.display());

    // Validation and preview generation are synchronous and fast, so they
    // run under one lock: the UI never observes a half-started attempt.
    let upload = {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        if !state_guard.is_current_attempt(seq) {
            tracing::info!("Skipping superseded request #{}", seq);
            return;
        }

        let upload = match read_image_upload(&path) {
            Ok(upload) => upload,
            Err(e) => {
                tracing::warn!("Rejected '{}': {}", path.display(), e);
                state_guard.fail(e.to_string());
                proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
                    &state_guard,
                ))));
                return;
            }
        };

        state_guard.set_preview_ready(ImagePreview::from_upload(&upload));
        proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
            &state_guard,
        ))));

        // No confirmation step: preview done means the request goes out now.
        state_guard.set_classifying();
        proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
            &state_guard,
        ))));

        upload
    };

    // The only suspension point of the workflow. The lock is not held here.
    let outcome = classifier.classify(upload).await;

    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    if !state_guard.is_current_attempt(seq) {
        tracing::info!("Discarding outcome of superseded request #{}", seq);
        return;
    }

    match outcome {
        Ok(result) => state_guard.succeed(result),
        Err(e) => {
            tracing::warn!("Classification attempt #{} failed: {}", seq, e);
            state_guard.fail(e.to_string());
        }
    }
    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}
