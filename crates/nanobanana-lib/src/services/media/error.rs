// Media Service Error Types

use thiserror::Error;

use crate::utils::shared_store::sanitize_error;

/// Media Service Error
#[derive(Error, Debug)]
pub enum MediaError {
    /// Error reported by the API, with its HTTP/API status code
    #[error("Gemini API error ({status}): {message}")]
    Api {
        status: u16,
        /// Canonical status string such as `NOT_FOUND`, when the API sent one
        api_status: Option<String>,
        message: String,
    },

    /// Cannot reach the API
    #[error("Cannot connect to Gemini service: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Gemini service response timeout")]
    Timeout,

    /// Other transport failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Image response carried no inline image part
    #[error("No image data in response")]
    NoImageData,

    /// Finished video job carried no download reference
    #[error("Video generation failed: no video in response")]
    VideoFailed,

    /// The wait for the video job was aborted
    #[error("Video generation cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("Response parse error: {0}")]
    ParseError(String),

    /// IO error while storing a payload
    #[error("IO error: {0}")]
    IoError(String),

    /// Missing API key or malformed configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MediaError::Timeout
        } else if err.is_connect() {
            MediaError::ConnectionFailed(sanitize_error(&err.to_string()))
        } else {
            MediaError::Transport(sanitize_error(&err.to_string()))
        }
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(err: serde_json::Error) -> Self {
        MediaError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::IoError(err.to_string())
    }
}

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    ApiError,
    NotFound,
    ConnectionFailed,
    Timeout,
    Transport,
    NoImageData,
    VideoFailed,
    Cancelled,
    ParseError,
    IoError,
    InvalidConfig,
}

impl MediaErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaErrorCode::ApiError => "MEDIA_API_ERROR",
            MediaErrorCode::NotFound => "MEDIA_NOT_FOUND",
            MediaErrorCode::ConnectionFailed => "MEDIA_CONNECTION_FAILED",
            MediaErrorCode::Timeout => "MEDIA_TIMEOUT",
            MediaErrorCode::Transport => "MEDIA_TRANSPORT",
            MediaErrorCode::NoImageData => "MEDIA_NO_IMAGE_DATA",
            MediaErrorCode::VideoFailed => "MEDIA_VIDEO_FAILED",
            MediaErrorCode::Cancelled => "MEDIA_CANCELLED",
            MediaErrorCode::ParseError => "MEDIA_PARSE_ERROR",
            MediaErrorCode::IoError => "MEDIA_IO_ERROR",
            MediaErrorCode::InvalidConfig => "MEDIA_INVALID_CONFIG",
        }
    }
}

impl MediaError {
    pub fn code(&self) -> MediaErrorCode {
        match self {
            e if e.is_entitlement_missing() => MediaErrorCode::NotFound,
            MediaError::Api { .. } => MediaErrorCode::ApiError,
            MediaError::ConnectionFailed(_) => MediaErrorCode::ConnectionFailed,
            MediaError::Timeout => MediaErrorCode::Timeout,
            MediaError::Transport(_) => MediaErrorCode::Transport,
            MediaError::NoImageData => MediaErrorCode::NoImageData,
            MediaError::VideoFailed => MediaErrorCode::VideoFailed,
            MediaError::Cancelled => MediaErrorCode::Cancelled,
            MediaError::ParseError(_) => MediaErrorCode::ParseError,
            MediaError::IoError(_) => MediaErrorCode::IoError,
            MediaError::InvalidConfig(_) => MediaErrorCode::InvalidConfig,
        }
    }

    /// Whether the error means the active key lacks video entitlement.
    ///
    /// The API answers "Requested entity was not found" (HTTP 404 /
    /// `NOT_FOUND`) when the key cannot reach the video model. Any 404 from
    /// the generation endpoints is treated this way.
    pub fn is_entitlement_missing(&self) -> bool {
        match self {
            MediaError::Api {
                status, api_status, ..
            } => *status == 404 || api_status.as_deref() == Some("NOT_FOUND"),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Cancelled)
    }

    /// Convert to a user-facing message
    pub fn to_user_message(&self) -> String {
        sanitize_error(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, api_status: Option<&str>) -> MediaError {
        MediaError::Api {
            status,
            api_status: api_status.map(str::to_string),
            message: "Requested entity was not found.".to_string(),
        }
    }

    #[test]
    fn test_404_is_entitlement_missing() {
        assert!(api(404, None).is_entitlement_missing());
        assert!(api(404, Some("NOT_FOUND")).is_entitlement_missing());
        assert_eq!(api(404, None).code(), MediaErrorCode::NotFound);
    }

    #[test]
    fn test_not_found_status_without_404_code() {
        assert!(api(400, Some("NOT_FOUND")).is_entitlement_missing());
    }

    #[test]
    fn test_message_text_alone_is_not_classified() {
        // Only the structured status decides, never the message text.
        assert!(!api(500, Some("INTERNAL")).is_entitlement_missing());
        assert!(!MediaError::Transport("Requested entity was not found".to_string())
            .is_entitlement_missing());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(MediaErrorCode::Cancelled.as_str(), "MEDIA_CANCELLED");
        assert_eq!(MediaError::NoImageData.code(), MediaErrorCode::NoImageData);
        assert_eq!(api(429, Some("RESOURCE_EXHAUSTED")).code(), MediaErrorCode::ApiError);
    }

    #[test]
    fn test_user_message_redacts_key() {
        let err = MediaError::Transport("url (https://h/x?key=SECRET)".to_string());
        assert!(!err.to_user_message().contains("SECRET"));
    }
}
