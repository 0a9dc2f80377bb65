use crate::{
    config::{CustomBackendConfig, ValidationConfig},
    error::{Result, TryOnError},
    models::{CustomBackendUploadResponse, ImageFile, ImageKind, UploadResult},
    upload::{traits::ImageHost, validate_image_file},
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// Self-hosted upload backend: multipart POST, response is `{"url": ...}`.
pub struct CustomBackendHost {
    client: Client,
    endpoint: String,
    rules: ValidationConfig,
}

impl CustomBackendHost {
    pub fn new(config: CustomBackendConfig, rules: ValidationConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .ok_or_else(|| TryOnError::Config("Upload backend endpoint is required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            rules,
        })
    }
}

#[async_trait]
impl ImageHost for CustomBackendHost {
    fn name(&self) -> &'static str {
        "custom-backend"
    }

    async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult> {
        validate_image_file(file, &self.rules)?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TryOnError::Upload(format!("Invalid file part: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("type", kind.as_str());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TryOnError::Network(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TryOnError::Upload(format!(
                "Custom backend upload failed: {}",
                response.status()
            )));
        }

        let payload: CustomBackendUploadResponse = response
            .json()
            .await
            .map_err(|e| TryOnError::Upload(format!("Failed to parse upload response: {}", e)))?;

        Ok(UploadResult {
            url: payload.url,
            public_id: None,
            width: None,
            height: None,
            format: None,
            bytes: Some(file.size()),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_required() {
        let err = CustomBackendHost::new(CustomBackendConfig::new(), ValidationConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, TryOnError::Config(_)));
    }
}
