use crate::{
    config::{ImgurConfig, ValidationConfig},
    error::{Result, TryOnError},
    models::{ImageFile, ImageKind, ImgurUploadResponse, UploadResult},
    upload::{traits::ImageHost, validate_image_file},
};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

const IMGUR_UPLOAD_URL: &str = "https://api.imgur.com/3/image";

/// Anonymous public image host. Auth is a client id header; the public link
/// comes back under `data.link`.
pub struct ImgurHost {
    client: Client,
    client_id: String,
    rules: ValidationConfig,
}

impl ImgurHost {
    pub fn new(config: ImgurConfig, rules: ValidationConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .ok_or_else(|| TryOnError::Config("Imgur client id is required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            client_id,
            rules,
        })
    }
}

#[async_trait]
impl ImageHost for ImgurHost {
    fn name(&self) -> &'static str {
        "imgur"
    }

    async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult> {
        validate_image_file(file, &self.rules)?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TryOnError::Upload(format!("Invalid file part: {}", e)))?;

        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(IMGUR_UPLOAD_URL)
            .header(AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TryOnError::Network(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TryOnError::Upload(format!(
                "Imgur upload failed: {}",
                response.status()
            )));
        }

        let payload: ImgurUploadResponse = response
            .json()
            .await
            .map_err(|e| TryOnError::Upload(format!("Failed to parse upload response: {}", e)))?;

        Ok(UploadResult {
            url: payload.data.link,
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
    fn client_id_is_required() {
        let err = ImgurHost::new(ImgurConfig::new(), ValidationConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, TryOnError::Config(_)));
    }
}
