// Workflow session models
// Step pointer, generated asset reference and live session state

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::prompt::{MediaType, PromptConfig};

/// Wizard step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Input = 1,
    Optimize = 2,
    Generate = 3,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Step::Input => "Concept Input",
            Step::Optimize => "Prompt Result",
            Step::Generate => "Media Output",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.display_name())
    }
}

/// Reference to a generated asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AssetRef {
    /// Inline `data:<mime>;base64,<payload>` reference (images)
    DataUrl(String),
    /// Payload written to the local cache (videos)
    File(PathBuf),
}

impl AssetRef {
    /// Build a data URL from a mime type and base64 payload
    pub fn data_url(mime_type: &str, base64_data: &str) -> Self {
        AssetRef::DataUrl(format!("data:{};base64,{}", mime_type, base64_data))
    }

    /// Short description suitable for status output
    pub fn describe(&self) -> String {
        match self {
            AssetRef::DataUrl(url) => {
                let header = url.split(',').next().unwrap_or_default();
                format!("{} ({} bytes encoded)", header, url.len())
            }
            AssetRef::File(path) => path.display().to_string(),
        }
    }
}

// ============================================================================
// Status messages
// ============================================================================

pub const STATUS_OPTIMIZING: &str = "Optimizing prompt with Gemini...";
pub const STATUS_OPTIMIZE_FAILED: &str = "Failed to optimize prompt.";
pub const STATUS_KEY_REQUIRED: &str = "Video API key required...";
pub const STATUS_GENERATE_FAILED: &str = "Generation failed. Try again.";
pub const STATUS_GENERATE_CANCELLED: &str = "Generation cancelled.";

/// Status shown while the given media kind is being generated
pub fn generating_status(media_type: MediaType) -> String {
    match media_type {
        MediaType::Image => "Processing image...".to_string(),
        MediaType::Video => "Processing video...".to_string(),
    }
}

/// Live session state, replaced wholesale on reset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub config: PromptConfig,
    /// Empty until optimization succeeds
    pub optimized_prompt: String,
    pub generated: Option<AssetRef>,
    pub is_loading: bool,
    pub status: String,
}

impl WorkflowState {
    /// Fresh state carrying the given configuration
    pub fn new(config: PromptConfig) -> Self {
        Self {
            config,
            optimized_prompt: String::new(),
            generated: None,
            is_loading: false,
            status: String::new(),
        }
    }
}
