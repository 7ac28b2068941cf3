// Gemini Media Client
//
// Prompt optimization and image synthesis go through `generateContent`;
// video synthesis is a long-running `predictLongRunning` job that is polled
// until done, then downloaded.
// Default endpoint: https://generativelanguage.googleapis.com/v1beta

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Response,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::entitlement::EntitlementHost;
use super::prompt_builder::{build_system_instruction, build_user_content, OPTIMIZE_TEMPERATURE};
use super::{MediaBackend, MediaError, MediaResult};
use crate::models::{AspectRatio, AssetRef, PromptConfig};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Interval between video job status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// Resolution requested for every video job
pub const VIDEO_RESOLUTION: &str = "720p";

/// Mime type assumed when an inline image part does not declare one
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Connection settings for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    /// Key used when the entitlement host has none selected
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    /// Per-request timeout; polling itself is unbounded
    pub request_timeout: Duration,
    /// Where downloaded video payloads are written
    pub cache_dir: PathBuf,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, cache_dir: PathBuf) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(120),
            cache_dir,
        }
    }
}

/// Gemini REST client implementing the three media operations
pub struct GeminiMediaClient {
    config: GeminiConfig,
    client: Client,
    host: Arc<dyn EntitlementHost>,
}

impl GeminiMediaClient {
    pub fn new(config: GeminiConfig, host: Arc<dyn EntitlementHost>) -> Self {
        Self {
            config,
            client: Client::new(),
            host,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Key for the next request: the host's selection wins over configuration
    fn api_key(&self) -> MediaResult<String> {
        self.host
            .selected_key()
            .or_else(|| self.config.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                MediaError::InvalidConfig(
                    "No Gemini API key configured (set GEMINI_API_KEY)".to_string(),
                )
            })
    }

    fn api_url(&self, path: &str, key: &str) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        format!("{}{}?key={}", base, path, key)
    }

    fn content_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> MediaResult<GenerateContentResponse> {
        let key = self.api_key()?;
        let url = self.api_url(&format!("/models/{}:generateContent", model), &key);

        let response = self
            .client
            .post(&url)
            .headers(self.content_headers())
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn submit_video_job(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        key: &str,
    ) -> MediaResult<Operation> {
        let url = self.api_url(
            &format!("/models/{}:predictLongRunning", self.config.video_model),
            key,
        );
        let request = build_video_request(prompt, aspect_ratio);

        let response = self
            .client
            .post(&url)
            .headers(self.content_headers())
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let operation: Operation = serde_json::from_str(&body)?;
        log::info!("Video job submitted: {}", operation.name);
        Ok(operation)
    }

    async fn get_operation(&self, name: &str, key: &str) -> MediaResult<Operation> {
        let url = self.api_url(&format!("/{}", name.trim_start_matches('/')), key);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Poll until the job is done. Unbounded; only cancellation or an error
    /// ends the wait early.
    async fn wait_for_operation(
        &self,
        mut operation: Operation,
        key: &str,
        cancel: &CancellationToken,
    ) -> MediaResult<Operation> {
        let mut polls: u64 = 0;

        while !operation.done {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("Video job {} wait cancelled after {} polls", operation.name, polls);
                    return Err(MediaError::Cancelled);
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            polls += 1;
            log::debug!("Polling video job {} (#{})", operation.name, polls);

            operation = tokio::select! {
                _ = cancel.cancelled() => return Err(MediaError::Cancelled),
                next = self.get_operation(&operation.name, key) => next?,
            };
        }

        Ok(operation)
    }

    async fn download_video(&self, uri: &str, key: &str) -> MediaResult<PathBuf> {
        let response = self.client.get(with_key(uri, key)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status.as_u16(), &body));
        }
        let bytes = response.bytes().await?;

        let dir = self.config.cache_dir.join("videos");
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.mp4", Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;

        log::info!("Video saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[async_trait]
impl MediaBackend for GeminiMediaClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn optimize_prompt(&self, config: &PromptConfig) -> MediaResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(build_user_content(config))],
            system_instruction: Some(Content::text(build_system_instruction(config))),
            generation_config: Some(GenerationConfig {
                temperature: Some(OPTIMIZE_TEMPERATURE),
                image_config: None,
            }),
        };

        let response = self.generate_content(&self.config.text_model, &request).await?;
        let text = response.first_text();
        let optimized = text.trim();

        if optimized.is_empty() {
            log::warn!("Empty optimization response, keeping the original concept");
            return Ok(config.concept.clone());
        }
        Ok(optimized.to_string())
    }

    async fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> MediaResult<AssetRef> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt.to_string())],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect_ratio.as_str().to_string(),
                }),
            }),
        };

        let response = self.generate_content(&self.config.image_model, &request).await?;
        response.first_image().ok_or(MediaError::NoImageData)
    }

    async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: &CancellationToken,
    ) -> MediaResult<AssetRef> {
        if !self.host.has_video_entitlement() {
            self.host.request_key_selection();
        }

        if cancel.is_cancelled() {
            return Err(MediaError::Cancelled);
        }

        let key = self.api_key()?;
        let submitted = self.submit_video_job(prompt, aspect_ratio, &key).await?;
        let finished = self.wait_for_operation(submitted, &key, cancel).await?;

        if let Some(error) = finished.error {
            return Err(error.into_media_error(500));
        }

        let uri = finished.video_uri().ok_or(MediaError::VideoFailed)?;
        let path = tokio::select! {
            _ = cancel.cancelled() => return Err(MediaError::Cancelled),
            saved = self.download_video(&uri, &key) => saved?,
        };
        Ok(AssetRef::File(path))
    }
}

/// Return the body of a successful response, or the structured API error
async fn read_success_body(response: Response) -> MediaResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let error = parse_api_error(status.as_u16(), &body);
        log::warn!("Gemini request failed: {}", error.to_user_message());
        return Err(error);
    }
    Ok(body)
}

/// Build a structured error from an error response body
pub(crate) fn parse_api_error(status: u16, body: &str) -> MediaError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.into_media_error(status),
        Err(_) => MediaError::Api {
            status,
            api_status: None,
            message: if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

/// Append the credential to a download URI
pub(crate) fn with_key(uri: &str, key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}key={}", uri, separator, key)
}

fn build_video_request(prompt: &str, aspect_ratio: AspectRatio) -> PredictLongRunningRequest {
    PredictLongRunningRequest {
        instances: vec![VideoInstance {
            prompt: prompt.to_string(),
        }],
        parameters: VideoParameters {
            aspect_ratio: aspect_ratio.as_str().to_string(),
            resolution: VIDEO_RESOLUTION.to_string(),
            sample_count: 1,
        },
    }
}

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(text: String) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text),
                inline_data: None,
            }],
        }
    }

    fn user_text(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            ..Self::text(text)
        }
    }
}

/// A content part: text or inline binary data
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    /// Base64 payload
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate
    fn first_text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// First inline image part as a data URL
    fn first_image(&self) -> Option<AssetRef> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| {
                AssetRef::data_url(d.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME), &d.data)
            })
    }
}

#[derive(Debug, Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    resolution: String,
    sample_count: u32,
}

/// Long-running video job handle
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    #[serde(default)]
    uri: Option<String>,
}

impl Operation {
    fn video_uri(&self) -> Option<String> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .clone()
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl ErrorDetail {
    fn into_media_error(self, fallback_status: u16) -> MediaError {
        MediaError::Api {
            status: self.code.unwrap_or(fallback_status),
            api_status: self.status,
            message: self.message,
        }
    }
}
