//! Local acceptance rules for a submitted image file.
//!
//! These checks run before any preview is generated or any network request is
//! made. A desktop drop or pick hands us a path, so the MIME type is guessed
//! from the extension and the size comes from filesystem metadata.

use std::path::Path;
use thiserror::Error;

/// Hard upper bound on the upload size: 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Errors raised by local validation. None of these ever reach the network.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("'{name}' is not an image file. Please choose a JPG, PNG or similar image.")]
    InvalidFileType { name: String },

    #[error("'{name}' is too large ({size} bytes). The maximum upload size is 5 MB.")]
    FileTooLarge { name: String, size: u64 },

    #[error("Could not read '{name}': {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// An accepted upload: the file's bytes plus what the classifier request
/// and the preview need to know about them.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Checks the MIME type and byte size of `path` without reading its content.
pub fn validate_image_path(path: &Path) -> Result<(), UploadError> {
    let name = display_name(path);

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(UploadError::InvalidFileType { name });
    }

    let metadata = std::fs::metadata(path).map_err(|source| UploadError::Unreadable {
        name: name.clone(),
        source,
    })?;
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::FileTooLarge {
            name,
            size: metadata.len(),
        });
    }

    Ok(())
}

/// Validates `path` and reads it into an [`ImageUpload`]. The single read
/// serves both the preview and the classify request.
pub fn read_image_upload(path: &Path) -> Result<ImageUpload, UploadError> {
    validate_image_path(path)?;

    let name = display_name(path);
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let bytes = std::fs::read(path).map_err(|source| UploadError::Unreadable {
        name: name.clone(),
        source,
    })?;

    Ok(ImageUpload {
        file_name: name,
        mime: mime.essence_str().to_string(),
        bytes,
    })
}
