use crate::{
    error::Result,
    models::{ImageFile, ImageKind, ProgressSender, UploadEvent, UploadProgress, UploadResult},
    upload::traits::ImageHost,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Network-free fallback: embeds the file bytes directly into a `data:` URL.
/// Succeeds for any readable input, so it also serves as the retry target
/// when a remote host throws.
pub struct DataUrlHost;

impl DataUrlHost {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DataUrlHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageHost for DataUrlHost {
    fn name(&self) -> &'static str {
        "data-url"
    }

    async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult> {
        let encoded = STANDARD.encode(&file.bytes);
        let url = format!("data:{};base64,{}", file.content_type, encoded);

        log::debug!("Created embedded data URL for {}", kind);

        Ok(UploadResult {
            url,
            public_id: None,
            width: None,
            height: None,
            format: None,
            bytes: Some(file.size()),
            kind,
        })
    }

    /// There is no transfer to observe, so progress is simulated with the
    /// same stepped sequence the remote hosts would produce.
    async fn upload_image_with_progress(
        &self,
        file: &ImageFile,
        kind: ImageKind,
        events: ProgressSender,
    ) -> Result<UploadResult> {
        let total = file.size();
        for percent in [20u64, 40, 60, 80, 100] {
            let loaded = total * percent / 100;
            let _ = events.send(UploadEvent::Progress(UploadProgress {
                percent: percent as f64,
                loaded,
                total,
            }));
        }

        let result = self.upload_image(file, kind).await?;
        let _ = events.send(UploadEvent::Completed {
            url: result.url.clone(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sample_file() -> ImageFile {
        ImageFile {
            name: "me.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3, 4],
        }
    }

    #[tokio::test]
    async fn embeds_bytes_as_data_url() {
        let result = DataUrlHost::new()
            .upload_image(&sample_file(), ImageKind::Subject)
            .await
            .unwrap();
        assert_eq!(result.url, "data:image/png;base64,AQIDBA==");
        assert_eq!(result.bytes, Some(4));
    }

    #[tokio::test]
    async fn simulated_progress_is_monotone_and_ends_at_100() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        DataUrlHost::new()
            .upload_image_with_progress(&sample_file(), ImageKind::Clothing, tx)
            .await
            .unwrap();

        let mut percents = Vec::new();
        let mut completed = false;
        while let Some(event) = rx.recv().await {
            match event {
                UploadEvent::Progress(p) => percents.push(p.percent),
                UploadEvent::Completed { .. } => completed = true,
                UploadEvent::Failed { .. } => panic!("unexpected failure event"),
            }
        }

        assert_eq!(percents, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*percents.last().unwrap(), 100.0);
        assert!(completed);
    }
}
