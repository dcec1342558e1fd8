//! The request/response contract with the remote classifier service.
//!
//! [`HttpClassifier`] is the production implementation: one multipart POST to
//! `{base_url}/classify` per attempt, no retries. Everything the service can
//! do to us (refuse the connection, reject the request, decline the image,
//! send garbage) is folded into the typed [`ClassificationError`] here, so
//! the controller never sees raw transport or wire-format details.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::validation::ImageUpload;
use crate::core::{Category, ClassificationResult};

/// The multipart field name the service expects the image under.
const FILE_FIELD: &str = "file";

/// Everything that can go wrong between "request built" and "typed result".
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The service could not be reached at all (connection refused, DNS
    /// failure, timeout). Names the endpoint so a misconfigured base URL is
    /// diagnosable from the error message alone.
    #[error("Cannot reach the classifier service at {endpoint}: {reason}")]
    ServiceUnreachable { endpoint: String, reason: String },

    /// The service answered with a non-2xx status.
    #[error("The classifier service rejected the request (HTTP {status}): {detail}")]
    ServiceRejected { status: u16, detail: String },

    /// A 2xx response whose body carries an explicit `success: false`.
    #[error("Classification failed: {0}")]
    ClassificationRejected(String),

    /// A 2xx response we could not interpret.
    #[error("The classifier service returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Seam between the upload controller and the network. The controller only
/// depends on this trait, which keeps the whole workflow testable with a
/// scripted in-memory classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        upload: ImageUpload,
    ) -> Result<ClassificationResult, ClassificationError>;
}

/// Success/failure body of the `/classify` endpoint.
///
/// The wire shape is duck-typed on the service side, so this schema is
/// deliberately loose: only `success` is required, the rest is validated
/// explicitly after parsing.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    success: bool,
    class: Option<String>,
    confidence: Option<f64>,
    probabilities: Option<BTreeMap<String, f64>>,
    message: Option<String>,
}

/// Error body variants: FastAPI uses `detail`, the service's own logical
/// failures use `message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// The production classifier speaking HTTP to the configured endpoint.
pub struct HttpClassifier {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClassifier {
    /// The base URL is injected at construction; nothing in here hard-codes
    /// a backend address.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/classify", self.base_url)
    }

    fn unreachable(&self, reason: impl ToString) -> ClassificationError {
        ClassificationError::ServiceUnreachable {
            endpoint: self.endpoint(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        upload: ImageUpload,
    ) -> Result<ClassificationResult, ClassificationError> {
        let endpoint = self.endpoint();
        tracing::debug!(
            "Sending '{}' ({} bytes) to {}",
            upload.file_name,
            upload.bytes.len(),
            endpoint
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)
            .map_err(|e| self.unreachable(format!("failed to build request: {e}")))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail.or(body.message))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!("Classifier rejected the request: {} ({})", status, detail);
            return Err(ClassificationError::ServiceRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.bytes().await.map_err(|e| self.unreachable(e))?;
        let parsed: ClassifyResponse = serde_json::from_slice(&body)
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        if !parsed.success {
            let message = parsed
                .message
                .unwrap_or_else(|| "the service could not classify this image".to_string());
            return Err(ClassificationError::ClassificationRejected(message));
        }

        let label = parsed.class.ok_or_else(|| {
            ClassificationError::MalformedResponse("missing 'class' field".to_string())
        })?;
        let confidence = parsed.confidence.ok_or_else(|| {
            ClassificationError::MalformedResponse("missing 'confidence' field".to_string())
        })?;

        let result = ClassificationResult {
            category: Category::parse(&label),
            label,
            confidence,
            // A missing or empty map means "no detail available"; never an error.
            probabilities: parsed.probabilities.unwrap_or_default(),
        };
        tracing::info!(
            "Classified as '{}' ({:.1}%)",
            result.label,
            result.confidence * 100.0
        );
        Ok(result)
    }
}
