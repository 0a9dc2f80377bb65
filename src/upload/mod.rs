pub mod cloudinary;
pub mod custom;
pub mod data_url;
pub mod imgur;
pub mod traits;

use crate::{
    config::{Config, DebugConfig, ValidationConfig},
    error::{Result, TryOnError},
    models::{ImageFile, ImageKind, ProgressSender, UploadResult, UploadedImagePair},
};
use std::sync::{Arc, Mutex};

pub use cloudinary::{CloudinaryHost, DeliveryOptions};
pub use custom::CustomBackendHost;
pub use data_url::DataUrlHost;
pub use imgur::ImgurHost;
pub use traits::ImageHost;

/// Checks file type and size against the configured rules. Runs before any
/// network call so a bad file never leaves the machine.
pub fn validate_image_file(file: &ImageFile, rules: &ValidationConfig) -> Result<()> {
    if !rules.allowed_types.iter().any(|t| t == &file.content_type) {
        return Err(TryOnError::Validation(format!(
            "Invalid file type. Allowed types: {}",
            rules.allowed_types.join(", ")
        )));
    }

    if file.size() > rules.max_file_size {
        return Err(TryOnError::Validation(format!(
            "File too large. Maximum size: {}",
            format_file_size(rules.max_file_size)
        )));
    }

    Ok(())
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let mut rendered = format!("{:.2}", value);
    if rendered.contains('.') {
        rendered = rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }
    format!("{} {}", rendered, UNITS[exponent])
}

/// Owns exactly one primary host, chosen from configuration in fixed
/// precedence, and the always-available data URL fallback. Any primary
/// failure is retried once against the fallback; a fallback failure
/// propagates unmodified. Successful URLs are cached per kind.
pub struct UploadManager {
    primary: Arc<dyn ImageHost>,
    fallback: DataUrlHost,
    uploaded: Mutex<UploadedImagePair>,
    debug: DebugConfig,
}

impl UploadManager {
    pub fn new(config: &Config) -> Result<Self> {
        let primary: Arc<dyn ImageHost> = if config.cloudinary.is_configured() {
            Arc::new(CloudinaryHost::new(
                config.cloudinary.clone(),
                config.validation.clone(),
            )?)
        } else if config.custom_backend.enabled {
            Arc::new(CustomBackendHost::new(
                config.custom_backend.clone(),
                config.validation.clone(),
            )?)
        } else if config.imgur.enabled {
            Arc::new(ImgurHost::new(
                config.imgur.clone(),
                config.validation.clone(),
            )?)
        } else {
            log::warn!("No image host configured, using embedded data URLs");
            Arc::new(DataUrlHost::new())
        };

        log::info!("Upload service selected: {}", primary.name());

        Ok(Self {
            primary,
            fallback: DataUrlHost::new(),
            uploaded: Mutex::new(UploadedImagePair::new()),
            debug: config.debug.clone(),
        })
    }

    pub fn provider(&self) -> &'static str {
        self.primary.name()
    }

    pub async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult> {
        let result = match self.primary.upload_image(file, kind).await {
            Ok(result) => result,
            Err(e) => {
                self.log_fallback(kind, &e);
                self.fallback.upload_image(file, kind).await?
            }
        };

        self.remember(kind, &result);
        Ok(result)
    }

    pub async fn upload_image_with_progress(
        &self,
        file: &ImageFile,
        kind: ImageKind,
        events: ProgressSender,
    ) -> Result<UploadResult> {
        let result = match self
            .primary
            .upload_image_with_progress(file, kind, events.clone())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                self.log_fallback(kind, &e);
                self.fallback
                    .upload_image_with_progress(file, kind, events)
                    .await?
            }
        };

        self.remember(kind, &result);
        Ok(result)
    }

    fn log_fallback(&self, kind: ImageKind, error: &TryOnError) {
        if self.debug.log_errors {
            log::warn!(
                "Primary host {} failed for {}, falling back to embedded data URL: {}",
                self.primary.name(),
                kind,
                error
            );
        }
    }

    fn remember(&self, kind: ImageKind, result: &UploadResult) {
        self.uploaded.lock().unwrap().set(kind, result.url.clone());
        if self.debug.log_uploads {
            log::debug!("Upload successful for {}: {}", kind, result.url);
        }
    }

    pub fn uploaded_urls(&self) -> UploadedImagePair {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn clear_uploaded(&self) {
        self.uploaded.lock().unwrap().clear();
        log::debug!("Uploaded image URLs cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CloudinaryConfig, CustomBackendConfig, ImgurConfig};

    fn sample_file() -> ImageFile {
        ImageFile {
            name: "me.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![9, 8, 7],
        }
    }

    #[test]
    fn rejects_disallowed_type() {
        let file = ImageFile {
            name: "doc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![0; 10],
        };
        let err = validate_image_file(&file, &ValidationConfig::default()).unwrap_err();
        assert!(matches!(err, TryOnError::Validation(_)));
    }

    #[test]
    fn rejects_oversized_file() {
        let rules = ValidationConfig::default().with_max_file_size(2);
        let err = validate_image_file(&sample_file(), &rules).unwrap_err();
        assert!(matches!(err, TryOnError::Validation(_)));
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn accepts_valid_file() {
        assert!(validate_image_file(&sample_file(), &ValidationConfig::default()).is_ok());
    }

    #[test]
    fn file_sizes_render_human_readably() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
    }

    #[test]
    fn selection_precedence_prefers_cloudinary() {
        let config = Config::new()
            .with_cloudinary(CloudinaryConfig::new().with_credentials("demo", "preset"))
            .with_custom_backend(CustomBackendConfig::new().with_endpoint("http://host/upload"))
            .with_imgur(ImgurConfig::new().with_client_id("abc"));
        assert_eq!(UploadManager::new(&config).unwrap().provider(), "cloudinary");
    }

    #[test]
    fn selection_falls_through_custom_then_imgur_then_data_url() {
        let config = Config::new()
            .with_custom_backend(CustomBackendConfig::new().with_endpoint("http://host/upload"))
            .with_imgur(ImgurConfig::new().with_client_id("abc"));
        assert_eq!(
            UploadManager::new(&config).unwrap().provider(),
            "custom-backend"
        );

        let config = Config::new().with_imgur(ImgurConfig::new().with_client_id("abc"));
        assert_eq!(UploadManager::new(&config).unwrap().provider(), "imgur");

        assert_eq!(
            UploadManager::new(&Config::new()).unwrap().provider(),
            "data-url"
        );
    }

    #[tokio::test]
    async fn primary_failure_falls_back_to_data_url_result() {
        // An .invalid hostname never resolves, so the primary always throws.
        let config = Config::new()
            .with_custom_backend(CustomBackendConfig::new().with_endpoint("http://tryon.invalid/upload"));
        let manager = UploadManager::new(&config).unwrap();
        let file = sample_file();

        let via_manager = manager
            .upload_image(&file, ImageKind::Subject)
            .await
            .unwrap();
        let direct = DataUrlHost::new()
            .upload_image(&file, ImageKind::Subject)
            .await
            .unwrap();

        assert_eq!(via_manager.url, direct.url);
        assert_eq!(via_manager.bytes, direct.bytes);
    }

    #[tokio::test]
    async fn successful_uploads_are_cached_per_kind() {
        let manager = UploadManager::new(&Config::new()).unwrap();
        let file = sample_file();

        manager
            .upload_image(&file, ImageKind::Subject)
            .await
            .unwrap();
        assert!(manager.uploaded_urls().subject_image_url.is_some());
        assert!(manager.uploaded_urls().clothing_image_url.is_none());

        manager
            .upload_image(&file, ImageKind::Clothing)
            .await
            .unwrap();
        assert!(manager.uploaded_urls().is_complete());

        manager.clear_uploaded();
        assert!(!manager.uploaded_urls().is_complete());
    }
}
