//! Image ingestion: validation and data URI encoding.

use crate::error::{ReportError, Result};
use crate::models::ImageAttachment;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Upload ceiling applied when no configuration overrides it (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked by the user, as handed over by the webview.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Type and size checks, run before any decoding.
pub fn validate(name: &str, media_type: &str, size: u64, max_bytes: u64) -> Result<()> {
    if !media_type.starts_with("image/") {
        log::warn!("rejected upload {}: media type {:?}", name, media_type);
        return Err(ReportError::InvalidFileType(if media_type.is_empty() {
            "unknown type".to_string()
        } else {
            media_type.to_string()
        }));
    }

    if size > max_bytes {
        log::warn!("rejected upload {}: {} bytes", name, size);
        return Err(ReportError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }

    Ok(())
}

/// Validates an upload and embeds it as a self-contained data URI.
pub fn ingest(upload: ImageUpload, max_bytes: u64) -> Result<ImageAttachment> {
    validate(
        &upload.name,
        &upload.media_type,
        upload.bytes.len() as u64,
        max_bytes,
    )?;

    let data_uri = encode_data_uri(&upload.media_type, &upload.bytes);
    log::debug!(
        "ingested {} ({} bytes, {})",
        upload.name,
        upload.bytes.len(),
        upload.media_type
    );

    Ok(ImageAttachment {
        data_uri,
        file_name: upload.name,
    })
}

/// Reads an image from disk. The media type is derived from the extension.
///
/// Size is checked from metadata so oversized files are never read in full.
pub fn ingest_path(path: &Path, max_bytes: u64) -> Result<ImageAttachment> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ReportError::FileReadError("Could not determine image filename".to_string()))?
        .to_string();

    let media_type = media_type_for_path(path);
    let size = std::fs::metadata(path)
        .map_err(|e| ReportError::FileReadError(format!("{}: {}", path.display(), e)))?
        .len();
    validate(&name, media_type, size, max_bytes)?;

    let bytes = std::fs::read(path)
        .map_err(|e| ReportError::FileReadError(format!("{}: {}", path.display(), e)))?;

    ingest(
        ImageUpload {
            name,
            media_type: media_type.to_string(),
            bytes,
        },
        max_bytes,
    )
}

/// Media type guessed from a file extension; empty when unknown.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "",
    }
}

pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Splits a base64 data URI into its media type and raw bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| ReportError::FileReadError("Not a data URI".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReportError::FileReadError("Malformed data URI".to_string()))?;

    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| ReportError::FileReadError("Data URI is not base64 encoded".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ReportError::FileReadError(e.to_string()))?;

    Ok((media_type.to_string(), bytes))
}
