//! Output file naming for page images.

use tracing::warn;

use crate::page::PageId;

/// Extension used when the media type is missing or unknown.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Maps a `Content-Type` value to a file extension (with leading dot).
///
/// Parameters such as `; charset=...` are ignored. Returns `None` for
/// media types outside the table.
#[must_use]
pub fn extension_for_media_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let extension = match mime.as_str() {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/avif" => ".avif",
        "image/apng" => ".apng",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tif",
        "image/svg+xml" => ".svg",
        "application/pdf" => ".pdf",
        _ => return None,
    };
    Some(extension)
}

/// Extension for a response, falling back to [`FALLBACK_EXTENSION`].
#[must_use]
pub fn extension_or_fallback(content_type: Option<&str>) -> &'static str {
    match content_type.and_then(extension_for_media_type) {
        Some(extension) => extension,
        None => {
            warn!(
                content_type = content_type.unwrap_or("<none>"),
                "Unmapped media type; saving with {FALLBACK_EXTENSION} extension"
            );
            FALLBACK_EXTENSION
        }
    }
}

/// Builds `{position}_{token}{extension}`, e.g. `3_PA1.png`.
#[must_use]
pub fn page_filename(position: usize, id: PageId, extension: &str) -> String {
    format!("{position}_{id}{extension}")
}
