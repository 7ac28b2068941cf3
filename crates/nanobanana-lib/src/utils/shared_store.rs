// Shared Store Module
// App identifier, data/cache paths and message sanitization

use std::path::PathBuf;

// ============================================================================
// App Constants
// ============================================================================

/// App identifier used for data and cache directories
pub const APP_IDENTIFIER: &str = "com.nanobanana.NanoBanana";

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|p| p.join(APP_IDENTIFIER))
        .ok_or_else(|| "Could not determine application data directory".to_string())
}

/// Get the application cache directory (downloaded video payloads)
pub fn get_app_cache_dir() -> Result<PathBuf, String> {
    dirs::cache_dir()
        .map(|p| p.join(APP_IDENTIFIER))
        .ok_or_else(|| "Could not determine application cache directory".to_string())
}

// ============================================================================
// Error Sanitization
// ============================================================================

/// Sanitize error messages before they are shown or logged
///
/// Removes or obscures:
/// - Home directory paths
/// - API keys passed as `key=` query parameters
pub fn sanitize_error(error: &str) -> String {
    let home_dir = dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut sanitized = redact_query_key(error);

    if !home_dir.is_empty() {
        sanitized = sanitized.replace(&home_dir, "~");
    }

    sanitized
}

/// Redaction placeholder for sensitive values
const REDACTED: &str = "***REDACTED***";

/// Replace the value of every `key=` query parameter with a placeholder.
/// Transport errors echo the full request URL, which carries the API key.
pub fn redact_query_key(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = find_key_param(rest) {
        let value_start = pos + "key=".len();
        result.push_str(&rest[..value_start]);
        let tail = &rest[value_start..];
        let value_len = tail
            .find(|c: char| c == '&' || c == ')' || c == '"' || c.is_whitespace())
            .unwrap_or(tail.len());
        if value_len > 0 {
            result.push_str(REDACTED);
        }
        rest = &tail[value_len..];
    }

    result.push_str(rest);
    result
}

/// Position of a `key=` that starts a query parameter (after `?` or `&`)
fn find_key_param(text: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find("key=") {
        let pos = offset + found;
        if pos > 0 && matches!(text.as_bytes()[pos - 1], b'?' | b'&') {
            return Some(pos);
        }
        offset = pos + "key=".len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_query_key() {
        let msg = "error sending request for url (https://host/v1beta/models/x:generateContent?key=AIzaSecret123)";
        let sanitized = redact_query_key(msg);
        assert!(!sanitized.contains("AIzaSecret123"));
        assert!(sanitized.contains("?key=***REDACTED***)"));
    }

    #[test]
    fn test_redact_keeps_other_params() {
        let msg = "https://host/file?alt=media&key=abc&foo=bar";
        assert_eq!(
            redact_query_key(msg),
            "https://host/file?alt=media&key=***REDACTED***&foo=bar"
        );
    }

    #[test]
    fn test_redact_ignores_plain_words() {
        let msg = "monkey=banana is not a query parameter";
        assert_eq!(redact_query_key(msg), msg);
    }

    #[test]
    fn test_sanitize_error_replaces_home() {
        if let Some(home) = dirs::home_dir() {
            let msg = format!("failed to open {}/db.sqlite", home.display());
            assert!(sanitize_error(&msg).starts_with("failed to open ~"));
        }
    }
}
