//! Recipe image storage.
//!
//! Images arrive as base64 data URLs (`data:image/png;base64,...`), are
//! decoded and checked against their declared type, and are written under
//! `<media_root>/recipes/images/`. The database stores the path relative to
//! the media root; [`MediaStore::url`] turns it into an absolute URL.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Directory under the media root holding recipe images.
const RECIPE_IMAGE_DIR: &str = "recipes/images";

/// URL prefix the media root is served under.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Errors produced while decoding or storing an image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Expected a base64 data URL.")]
    NotDataUrl,
    #[error("Unsupported image type {0:?}.")]
    UnsupportedType(String),
    #[error("Image data is not valid base64.")]
    InvalidBase64,
    #[error("Image is empty.")]
    Empty,
    #[error("Image must be at most {} MiB.", MAX_IMAGE_BYTES / (1024 * 1024))]
    TooLarge,
    #[error("Image content does not match its declared type.")]
    ContentMismatch,
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Io(_) => Self::Internal(err.to_string()),
            other => Self::invalid("image", other.to_string()),
        }
    }
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used when storing.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()),
        }
    }
}

/// A decoded image ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<type>;base64,<payload>` URL.
///
/// # Errors
///
/// Returns a [`MediaError`] naming the first problem found.
pub fn decode_data_url(input: &str) -> Result<DecodedImage, MediaError> {
    let rest = input.trim().strip_prefix("data:").ok_or(MediaError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::NotDataUrl)?
        .to_ascii_lowercase();
    let format = ImageFormat::from_mime(&mime).ok_or(MediaError::UnsupportedType(mime))?;

    // base64 grows data by 4/3; reject oversized payloads before decoding.
    if payload.len() > MAX_IMAGE_BYTES.div_ceil(3) * 4 {
        return Err(MediaError::TooLarge);
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| MediaError::InvalidBase64)?;

    if bytes.is_empty() {
        return Err(MediaError::Empty);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge);
    }
    if !format.matches(&bytes) {
        return Err(MediaError::ContentMismatch);
    }

    Ok(DecodedImage { format, bytes })
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    /// Create a store rooted at `root`, linking files under `base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// The directory served at [`MEDIA_URL_PREFIX`].
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an image under a fresh name and return its relative path.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the directory or file cannot be written.
    pub async fn save(&self, image: &DecodedImage) -> Result<String, MediaError> {
        let dir = self.root.join(RECIPE_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.format.extension());
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        Ok(format!("{RECIPE_IMAGE_DIR}/{file_name}"))
    }

    /// Delete a stored image. Failures are logged, not returned.
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            tracing::warn!(image = relative, "Refusing to remove image outside media root");
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(image = relative, error = %e, "Failed to remove image");
        }
    }

    /// Absolute URL of a stored image.
    #[must_use]
    pub fn url(&self, relative: &str) -> String {
        format!("{}{MEDIA_URL_PREFIX}/{relative}", self.base_url)
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
        safe.then(|| self.root.join(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_decode_png() {
        let image = decode_data_url(&data_url("image/png", PNG_HEADER)).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.bytes, PNG_HEADER);
    }

    #[test]
    fn test_decode_rejections() {
        assert!(matches!(
            decode_data_url("https://example.com/a.png"),
            Err(MediaError::NotDataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png,plain"),
            Err(MediaError::NotDataUrl)
        ));
        assert!(matches!(
            decode_data_url(&data_url("image/svg+xml", b"<svg/>")),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(MediaError::InvalidBase64)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,"),
            Err(MediaError::Empty)
        ));
        assert!(matches!(
            decode_data_url(&data_url("image/jpeg", PNG_HEADER)),
            Err(MediaError::ContentMismatch)
        ));
    }

    #[test]
    fn test_decode_too_large() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            decode_data_url(&data_url("image/png", &bytes)),
            Err(MediaError::TooLarge)
        ));
    }

    #[test]
    fn test_media_error_maps_to_image_field() {
        let err = AppError::from(MediaError::NotDataUrl);
        assert!(matches!(err, AppError::Validation(ref e) if e.field("image").is_some()));
    }

    #[tokio::test]
    async fn test_save_url_and_remove() {
        let root = std::env::temp_dir().join(format!("foodgram-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&root, "http://localhost:8000");
        let image = decode_data_url(&data_url("image/png", PNG_HEADER)).unwrap();

        let relative = store.save(&image).await.unwrap();
        assert!(relative.starts_with("recipes/images/"));
        assert!(relative.ends_with(".png"));
        assert_eq!(
            store.url(&relative),
            format!("http://localhost:8000/media/{relative}")
        );
        assert!(root.join(&relative).exists());

        store.remove(&relative).await;
        assert!(!root.join(&relative).exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = MediaStore::new("/srv/media", "http://localhost:8000");
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("recipes/images/a.png").is_some());
    }
}
