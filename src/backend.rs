use crate::{
    config::BackendConfig,
    error::{Result, TryOnError},
    models::{GeneratedImageSet, TryOnResponse, UploadedImagePair},
};
use reqwest::header::ACCEPT;
use reqwest::Client;

/// Client for the remote try-on service. One GET per generation; the call is
/// never retried, a transient failure surfaces as-is.
pub struct TryOnClient {
    client: Client,
    endpoint: String,
}

impl TryOnClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends both uploaded URLs to the try-on service and returns the
    /// validated set of generated image URLs.
    pub async fn generate(&self, pair: &UploadedImagePair) -> Result<GeneratedImageSet> {
        let (subject_url, clothes_url) = pair.require_complete()?;

        log::info!("Sending request to try-on backend: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("subject_url", subject_url), ("clothes_url", clothes_url)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TryOnError::Network(format!("Try-on request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TryOnError::Network(format!(
                "Backend request failed: {}",
                status
            )));
        }

        let payload: TryOnResponse = response.json().await.map_err(|e| {
            TryOnError::InvalidResponse(format!("Failed to parse backend response: {}", e))
        })?;

        let images = GeneratedImageSet::from_response(payload)?;
        log::info!("Received {} image URL(s) from backend", images.len());
        Ok(images)
    }

    /// Fetches one generated image for saving to disk.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TryOnError::Network(format!("Image request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TryOnError::Network(format!(
                "Image request failed: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TryOnError::Network(format!("Image download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageKind;

    #[tokio::test]
    async fn incomplete_pair_is_rejected_without_a_request() {
        let client = TryOnClient::new(BackendConfig::default());
        let mut pair = UploadedImagePair::new();
        pair.set(ImageKind::Subject, "https://host/subject.png");

        let err = client.generate(&pair).await.unwrap_err();
        assert!(matches!(err, TryOnError::Upload(_)));
    }

    #[test]
    fn endpoint_comes_from_config() {
        let client = TryOnClient::new(BackendConfig::new().with_endpoint("http://host/output"));
        assert_eq!(client.endpoint(), "http://host/output");
    }
}
