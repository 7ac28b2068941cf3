// Asset Download
// Saves a generated asset as `nano-banana-<epoch-ms>.<png|mp4>`

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{AssetRef, MediaType};

/// File name for an asset saved at `timestamp_ms`
pub fn download_file_name(media_type: MediaType, timestamp_ms: i64) -> String {
    format!("nano-banana-{}.{}", timestamp_ms, media_type.extension())
}

/// Write `asset` into `dir` and return the saved path.
/// Data URLs are decoded; cached files are copied.
pub fn download_asset(
    asset: &AssetRef,
    media_type: MediaType,
    dir: &Path,
    timestamp_ms: i64,
) -> Result<PathBuf, String> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;

    let target = dir.join(download_file_name(media_type, timestamp_ms));

    match asset {
        AssetRef::DataUrl(url) => {
            let bytes = decode_data_url(url)?;
            fs::write(&target, bytes)
                .map_err(|e| format!("Failed to write {}: {}", target.display(), e))?;
        }
        AssetRef::File(source) => {
            fs::copy(source, &target).map_err(|e| {
                format!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                )
            })?;
        }
    }

    log::info!("Saved {} to {}", media_type.display_name(), target.display());
    Ok(target)
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "Not a data URL".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "Malformed data URL: missing payload".to_string())?;

    if !header.ends_with(";base64") {
        return Err(format!("Unsupported data URL encoding: {}", header));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Invalid base64 payload: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_name() {
        assert_eq!(
            download_file_name(MediaType::Image, 1712345678901),
            "nano-banana-1712345678901.png"
        );
        assert_eq!(
            download_file_name(MediaType::Video, 42),
            "nano-banana-42.mp4"
        );
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(decode_data_url("data:image/png;base64,QUJD").unwrap(), b"ABC");
        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_download_data_url_image() {
        let dir = tempdir().unwrap();
        let asset = AssetRef::data_url("image/png", "iVBORw0K");

        let path = download_asset(&asset, MediaType::Image, dir.path(), 1000).unwrap();

        assert_eq!(path, dir.path().join("nano-banana-1000.png"));
        assert_eq!(fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a]);
    }

    #[test]
    fn test_download_copies_cached_video() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("cached.mp4");
        fs::write(&source, b"video-bytes").unwrap();
        let out = dir.path().join("out");

        let path = download_asset(&AssetRef::File(source), MediaType::Video, &out, 7).unwrap();

        assert_eq!(path, out.join("nano-banana-7.mp4"));
        assert_eq!(fs::read(&path).unwrap(), b"video-bytes");
    }

    #[test]
    fn test_download_missing_source() {
        let dir = tempdir().unwrap();
        let asset = AssetRef::File(dir.path().join("gone.mp4"));
        assert!(download_asset(&asset, MediaType::Video, dir.path(), 1).is_err());
    }
}
