use crate::{
    error::Result,
    models::{ImageFile, ImageKind, ProgressSender, UploadEvent, UploadProgress, UploadResult},
};
use async_trait::async_trait;

/// A service that turns a local image file into a publicly usable URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload_image(&self, file: &ImageFile, kind: ImageKind) -> Result<UploadResult>;

    /// Like `upload_image`, publishing `UploadEvent`s on the given channel.
    /// The default implementation has no native progress source, so it emits
    /// a single terminal 100% before the `Completed` event.
    async fn upload_image_with_progress(
        &self,
        file: &ImageFile,
        kind: ImageKind,
        events: ProgressSender,
    ) -> Result<UploadResult> {
        match self.upload_image(file, kind).await {
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
