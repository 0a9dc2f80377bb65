use crate::{
    config::{CloudinaryConfig, ValidationConfig},
    error::{Result, TryOnError},
    models::{
        CloudinaryErrorBody, CloudinaryUploadResponse, ImageFile, ImageKind, ProgressSender,
        UploadEvent, UploadProgress, UploadResult,
    },
    upload::{traits::ImageHost, validate_image_file},
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Hosted image CDN client. Uploads go through an unsigned preset; the
/// response carries the public `secure_url` plus asset metadata.
pub struct CloudinaryHost {
    client: Client,
    config: CloudinaryConfig,
    rules: ValidationConfig,
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig, rules: ValidationConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(TryOnError::Config(
                "Cloudinary cloud name and upload preset are required".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            config,
            rules,
        })
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name.as_deref().unwrap_or_default()
        )
    }

    fn form_for(&self, kind: ImageKind, file_part: Part) -> Form {
        let preset = self.config.upload_preset.clone().unwrap_or_default();
        let mut form = Form::new()
            .part("file", file_part)
            .text("upload_preset", preset);

        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }
        if let Some(quality) = &self.config.quality {
            form = form.text("quality", quality.clone());
        }
        if let Some(fetch_format) = &self.config.fetch_format {
            form = form.text("fetch_format", fetch_format.clone());
        }

        form.text("tags", format!("tryon,{},client-upload", kind))
    }

    fn file_part(&self, file: &ImageFile) -> Result<Part> {
        Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TryOnError::Upload(format!("Invalid file part: {}", e)))
    }

    /// File body that reports each transferred chunk on the event channel.
    /// Chunks are emitted in order, so the percentages never decrease.
    fn progress_part(&self, file: &ImageFile, events: ProgressSender) -> Result<Part> {
        let total = file.size();
        let buffer = file.bytes.clone();

        let stream = futures::stream::unfold((buffer, 0usize), move |(buffer, offset)| {
            let events = events.clone();
            async move {
                if offset >= buffer.len() {
                    return None;
                }
                let end = (offset + UPLOAD_CHUNK_BYTES).min(buffer.len());
                let chunk = buffer[offset..end].to_vec();
                let _ = events.send(UploadEvent::Progress(UploadProgress::new(
                    end as u64, total,
                )));
                Some((Ok::<Vec<u8>, std::io::Error>(chunk), (buffer, end)))
            }
        });

        Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TryOnError::Upload(format!("Invalid file part: {}", e)))
    }

    async fn send_form(&self, form: Form, kind: ImageKind) -> Result<UploadResult> {
        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TryOnError::Network(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<CloudinaryErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(TryOnError::Upload(format!("Upload failed: {}", message)));
        }

        let payload: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| TryOnError::Upload(format!("Failed to parse upload response: {}", e)))?;

        Ok(UploadResult {
            url: payload.secure_url,
            public_id: Some(payload.public_id),
            width: payload.width,
            height: payload.height,
            format: payload.format,
            bytes: payload.bytes,
            kind,
        })
    }

    /// Builds a delivery URL with the requested transformation segments.
    pub fn delivery_url(&self, public_id: &str, options: &DeliveryOptions) -> String {
        let base = format!(
            "https://res.cloudinary.com/{}/image/upload",
            self.config.cloud_name.as_deref().unwrap_or_default()
        );

        let mut transformations = Vec::new();
        if let Some(width) = options.width {
            transformations.push(format!("w_{}", width));
        }
        if let Some(height) = options.height {
            transformations.push(format!("h_{}", height));
        }
        if let Some(crop) = &options.crop {
            transformations.push(format!("c_{}", crop));
        }
        if let Some(quality) = &options.quality {
            transformations.push(format!("q_{}", quality));
        }
        if let Some(format) = &options.format {
            transformations.push(format!("f_{}", format));
        }

        if transformations.is_empty() {
            format!("{}/{}", base, public_id)
        } else {
            format!("{}/{}/{}", base, transformations.join(","), public_id)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<String>,
    pub quality: Option<String>,
    pub format: Option<String>,
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult> {
        // Fail fast: nothing goes on the wire for a file that cannot pass.
        validate_image_file(file, &self.rules)?;

        log::debug!("Starting upload for {}: {}", kind, file.name);
        let form = self.form_for(kind, self.file_part(file)?);
        self.send_form(form, kind).await
    }

    async fn upload_image_with_progress(
        &self,
        file: &ImageFile,
        kind: ImageKind,
        events: ProgressSender,
    ) -> Result<UploadResult> {
        validate_image_file(file, &self.rules)?;

        log::debug!("Starting upload for {}: {}", kind, file.name);
        let form = self.form_for(kind, self.progress_part(file, events.clone())?);

        match self.send_form(form, kind).await {
            Ok(result) => {
                let _ = events.send(UploadEvent::Progress(UploadProgress::new(
                    file.size(),
                    file.size(),
                )));
                let _ = events.send(UploadEvent::Completed {
                    url: result.url.clone(),
                });
                Ok(result)
            }
            Err(e) => {
                let _ = events.send(UploadEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudinaryConfig;

    fn host() -> CloudinaryHost {
        CloudinaryHost::new(
            CloudinaryConfig::new().with_credentials("demo-cloud", "unsigned"),
            ValidationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn unconfigured_credentials_are_rejected() {
        let err = CloudinaryHost::new(CloudinaryConfig::new(), ValidationConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, TryOnError::Config(_)));
    }

    #[test]
    fn upload_endpoint_includes_cloud_name() {
        assert_eq!(
            host().upload_endpoint(),
            "https://api.cloudinary.com/v1_1/demo-cloud/image/upload"
        );
    }

    #[test]
    fn delivery_url_joins_transformations_in_order() {
        let options = DeliveryOptions {
            width: Some(200),
            height: Some(300),
            crop: Some("fill".to_string()),
            quality: Some("auto".to_string()),
            format: None,
        };
        assert_eq!(
            host().delivery_url("tryon-images/abc123", &options),
            "https://res.cloudinary.com/demo-cloud/image/upload/w_200,h_300,c_fill,q_auto/tryon-images/abc123"
        );
    }

    #[test]
    fn delivery_url_without_options_has_no_transform_segment() {
        assert_eq!(
            host().delivery_url("abc123", &DeliveryOptions::default()),
            "https://res.cloudinary.com/demo-cloud/image/upload/abc123"
        );
    }

    #[tokio::test]
    async fn invalid_file_type_fails_before_any_request() {
        let file = ImageFile {
            name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![0; 16],
        };
        let err = host()
            .upload_image(&file, ImageKind::Subject)
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_file_fails_before_any_request() {
        let rules = ValidationConfig::default().with_max_file_size(8);
        let host = CloudinaryHost::new(
            CloudinaryConfig::new().with_credentials("demo-cloud", "unsigned"),
            rules,
        )
        .unwrap();
        let file = ImageFile {
            name: "me.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; 32],
        };
        let err = host
            .upload_image(&file, ImageKind::Subject)
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Validation(_)));
    }
}
