//! Defines the central, mutable state of the upload-and-classify workflow.

use crate::config::AppConfig;
use crate::core::preview::ImagePreview;
use crate::core::ClassificationResult;
use std::path::PathBuf;

/// The finite set of workflow states the UI can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Nothing submitted yet, or everything cleared by a reset.
    Idle,
    /// A validated file has been decoded into a preview; the classify
    /// request is about to go out.
    PreviewReady,
    /// A classify request is in flight; no result or error exists yet.
    Classifying,
    Succeeded,
    Failed,
}

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` to allow for safe, shared
/// access from the main event loop, the IPC handler and spawned classify
/// tasks. Only controller code mutates it; the classification client just
/// returns values.
pub struct UploadState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// Where in the workflow the single active session currently is.
    pub phase: UploadPhase,
    /// Local preview of the selected image. Absent in `Idle`, and absent in
    /// `Failed` when validation rejected the file before decoding it.
    pub preview: Option<ImagePreview>,
    /// Present iff `phase == Succeeded`.
    pub result: Option<ClassificationResult>,
    /// Present iff `phase == Failed`.
    pub error_message: Option<String>,
    /// Tag of the most recent attempt. A classify task captures the value
    /// `begin_attempt` returned to it and may only mutate state while the
    /// live tag still matches; anything else is a superseded request whose
    /// outcome gets dropped.
    pub request_seq: u64,
    /// Where config writes from handlers go. `None` means the platform
    /// config directory; tests point this at a tempdir.
    pub config_dir_override: Option<PathBuf>,
}

impl Default for UploadState {
    /// Creates a default `UploadState` instance, loading the configuration from disk.
    fn default() -> Self {
        Self::with_config(AppConfig::load().unwrap_or_default())
    }
}

impl UploadState {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            phase: UploadPhase::Idle,
            preview: None,
            result: None,
            error_message: None,
            request_seq: 0,
            config_dir_override: None,
        }
    }

    /// Starts a new submission attempt: clears any previous outcome and
    /// preview, and claims a fresh tag. Whatever a still-in-flight older
    /// request comes back with is stale from this moment on.
    pub fn begin_attempt(&mut self) -> u64 {
        self.result = None;
        self.error_message = None;
        self.preview = None;
        self.request_seq += 1;
        self.request_seq
    }

    /// `true` while the attempt tagged `seq` is still the one whose outcome
    /// is allowed to mutate state.
    pub fn is_current_attempt(&self, seq: u64) -> bool {
        self.request_seq == seq
    }

    pub fn set_preview_ready(&mut self, preview: ImagePreview) {
        self.preview = Some(preview);
        self.phase = UploadPhase::PreviewReady;
    }

    pub fn set_classifying(&mut self) {
        self.phase = UploadPhase::Classifying;
    }

    pub fn succeed(&mut self, result: ClassificationResult) {
        self.result = Some(result);
        self.error_message = None;
        self.phase = UploadPhase::Succeeded;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.result = None;
        self.phase = UploadPhase::Failed;
    }

    /// Returns to `Idle`, clearing all optional fields. Valid from any
    /// state; also claims a fresh tag so an in-flight request cannot
    /// resurrect the session it belonged to.
    pub fn reset(&mut self) {
        self.phase = UploadPhase::Idle;
        self.preview = None;
        self.result = None;
        self.error_message = None;
        self.request_seq += 1;
    }
}
