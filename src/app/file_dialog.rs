//! An abstraction layer for native file dialogs to enable testing.

use crate::config::AppConfig;
use std::path::PathBuf;

/// Defines a common interface for file selection dialogs.
/// This allows for a mock implementation during tests, avoiding the need
/// to interact with actual OS dialog windows.
pub trait DialogService: Send + Sync {
    /// Opens a dialog to select a single image file. It uses the provided
    /// config to suggest the directory of the previous pick.
    fn pick_image(&self, config: &AppConfig) -> Option<PathBuf>;
}

/// The production implementation that uses the `rfd` crate to show native OS dialogs.
pub struct NativeDialogService;

impl DialogService for NativeDialogService {
    fn pick_image(&self, config: &AppConfig) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter(
            "Images",
            &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"],
        );
        if let Some(dir) = &config.last_image_directory {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }
}
