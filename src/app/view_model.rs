//! Responsible for transforming the `UploadState` into a `UiState` view model.
//!
//! This module acts as a presentation layer, preparing data specifically for
//! consumption by the webview: phase tags, the preview, and a display-ready
//! rendering of the classification result. The category lookup tables here
//! are pure data; any label the service invents that we do not know gets the
//! fallback row instead of being rejected.

use serde::Serialize;

use crate::config::AppConfig;
use crate::core::preview::ImagePreview;
use crate::core::{Category, ClassificationResult};

use super::state::{UploadPhase, UploadState};

/// A serializable representation of the application state for the UI.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub config: AppConfig,
    pub phase: &'static str,
    pub is_classifying: bool,
    pub preview: Option<ImagePreview>,
    pub result: Option<ResultView>,
    pub error_message: Option<String>,
}

/// A display-ready rendering of one classification result.
#[derive(Serialize, Clone, Debug)]
pub struct ResultView {
    /// Raw service label, the lookup key.
    pub label: String,
    /// Label with normalized casing for the headline.
    pub display_name: String,
    pub icon: &'static str,
    pub description: &'static str,
    pub confidence: f64,
    pub confidence_percent: String,
    /// Probability rows sorted by descending probability.
    pub probabilities: Vec<ProbabilityRow>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ProbabilityRow {
    pub label: String,
    pub icon: &'static str,
    pub percent: String,
}

fn phase_tag(phase: UploadPhase) -> &'static str {
    match phase {
        UploadPhase::Idle => "idle",
        UploadPhase::PreviewReady => "preview_ready",
        UploadPhase::Classifying => "classifying",
        UploadPhase::Succeeded => "succeeded",
        UploadPhase::Failed => "failed",
    }
}

pub fn icon_for_label(label: &str) -> &'static str {
    match Category::parse(label) {
        Some(Category::Glass) => "\u{1F376}",     // 🍶
        Some(Category::Paper) => "\u{1F4C4}",     // 📄
        Some(Category::Cardboard) => "\u{1F4E6}", // 📦
        Some(Category::Plastic) => "\u{1F4A7}",   // 💧
        Some(Category::Metal) => "\u{1F527}",     // 🔧
        Some(Category::Trash) => "\u{1F5D1}",     // 🗑
        None => "\u{2753}",                       // ❓ unknown label fallback
    }
}

pub fn description_for_label(label: &str) -> &'static str {
    match Category::parse(label) {
        Some(Category::Glass) => "Glass can be recycled again and again without losing quality.",
        Some(Category::Paper) => "Used paper can be turned into new, eco-friendly paper.",
        Some(Category::Cardboard) => "Cardboard is easy to recycle into new packaging material.",
        Some(Category::Plastic) => {
            "Plastic takes centuries to break down. Recycling is the way out."
        }
        Some(Category::Metal) => "Scrap metal has real economic value and recycles endlessly.",
        Some(Category::Trash) => "Mixed waste cannot be recycled. Dispose of it as general waste.",
        None => "No description available for this category.",
    }
}

fn build_result_view(result: &ClassificationResult) -> ResultView {
    let mut rows: Vec<(&String, &f64)> = result.probabilities.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    ResultView {
        label: result.label.clone(),
        display_name: result.display_name(),
        icon: icon_for_label(&result.label),
        description: description_for_label(&result.label),
        confidence: result.confidence,
        confidence_percent: format!("{:.1}%", result.confidence * 100.0),
        probabilities: rows
            .into_iter()
            .map(|(label, p)| ProbabilityRow {
                icon: icon_for_label(label),
                label: label.clone(),
                percent: format!("{:.1}%", p * 100.0),
            })
            .collect(),
    }
}

/// Creates the complete `UiState` from the current `UploadState`.
pub fn generate_ui_state(state: &UploadState) -> UiState {
    UiState {
        config: state.config.clone(),
        phase: phase_tag(state.phase),
        is_classifying: state.phase == UploadPhase::Classifying,
        preview: state.preview.clone(),
        result: state.result.as_ref().map(build_result_view),
        error_message: state.error_message.clone(),
    }
}
