use crate::error::{Result, TryOnError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which side of the try-on a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Subject,
    Clothing,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Subject => "subject",
            ImageKind::Clothing => "clothing",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image loaded into memory, ready for validation and upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TryOnError::Read(format!("Failed to read file {}: {}", path.display(), e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self {
            content_type: content_type_for_path(path).to_string(),
            name,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Outcome of a single upload, one per file per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub public_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
    pub kind: ImageKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UploadProgress {
    pub percent: f64,
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            (loaded as f64 / total as f64) * 100.0
        };
        Self {
            percent,
            loaded,
            total,
        }
    }
}

/// Events published on the progress channel during an upload. The channel
/// always ends with either `Completed` or `Failed`.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress(UploadProgress),
    Completed { url: String },
    Failed { message: String },
}

pub type ProgressSender = tokio::sync::mpsc::UnboundedSender<UploadEvent>;

/// The two public URLs the backend call needs, nullable until both uploads
/// have completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadedImagePair {
    pub subject_image_url: Option<String>,
    pub clothing_image_url: Option<String>,
}

impl UploadedImagePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: ImageKind, url: impl Into<String>) {
        match kind {
            ImageKind::Subject => self.subject_image_url = Some(url.into()),
            ImageKind::Clothing => self.clothing_image_url = Some(url.into()),
        }
    }

    pub fn get(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Subject => self.subject_image_url.as_deref(),
            ImageKind::Clothing => self.clothing_image_url.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.subject_image_url.is_some() && self.clothing_image_url.is_some()
    }

    /// Both URLs must be present before the backend call fires.
    pub fn require_complete(&self) -> Result<(&str, &str)> {
        match (
            self.subject_image_url.as_deref(),
            self.clothing_image_url.as_deref(),
        ) {
            (Some(subject), Some(clothing)) => Ok((subject, clothing)),
            (None, _) => Err(TryOnError::Upload(
                "Subject image URL missing before generation".to_string(),
            )),
            (_, None) => Err(TryOnError::Upload(
                "Clothing image URL missing before generation".to_string(),
            )),
        }
    }

    pub fn clear(&mut self) {
        self.subject_image_url = None;
        self.clothing_image_url = None;
    }
}

// Wire formats of the individual hosts.

#[derive(Debug, Deserialize)]
pub struct CloudinaryUploadResponse {
    pub secure_url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryErrorBody {
    pub error: Option<CloudinaryErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomBackendUploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImgurUploadResponse {
    pub data: ImgurImageData,
}

#[derive(Debug, Deserialize)]
pub struct ImgurImageData {
    pub link: String,
}
