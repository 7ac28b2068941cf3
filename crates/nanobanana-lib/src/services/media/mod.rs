// Media Service Module
// Prompt optimization, image synthesis and video synthesis backends

pub mod entitlement;
pub mod error;
pub mod gemini;
pub mod prompt_builder;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use entitlement::{EntitlementHost, KeySelector};
pub use error::{MediaError, MediaErrorCode, MediaResult};
pub use gemini::{GeminiConfig, GeminiMediaClient};

use crate::models::{AspectRatio, AssetRef, PromptConfig};

/// Trait for media generation backends
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Rewrite the concept into a detailed generation prompt.
    /// Falls back to the original concept when the model returns no text.
    async fn optimize_prompt(&self, config: &PromptConfig) -> MediaResult<String>;

    /// Synthesize one image; the result is an inline data URL
    async fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio)
        -> MediaResult<AssetRef>;

    /// Synthesize one video clip. Requests key selection when the host has no
    /// video entitlement, then waits on the job until it finishes or
    /// `cancel` fires.
    async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: &CancellationToken,
    ) -> MediaResult<AssetRef>;
}

#[cfg(test)]
mod gemini_tests;
