use crate::{
    backend::TryOnClient,
    config::{Config, UiConfig},
    error::Result,
    logger,
    models::{
        GeneratedImageSet, ImageFile, ImageKind, UploadEvent, UploadResult, UploadedImagePair,
    },
    upload::UploadManager,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Progress of one generate run, published for the caller to display.
#[derive(Debug, Clone)]
pub enum PipelineStatus {
    Validating,
    Uploading { kind: ImageKind, percent: f64 },
    Requesting,
    Done { label: String, note: String },
    Failed { message: String },
}

pub type StatusSender = mpsc::UnboundedSender<PipelineStatus>;

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct TryOnOutcome {
    pub pair: UploadedImagePair,
    pub images: GeneratedImageSet,
    pub label: String,
    pub note: String,
}

/// Drives one try-on attempt end to end: validate both files, upload them
/// one after the other, request generation, hand back the result set.
pub struct TryOnPipeline {
    uploads: UploadManager,
    backend: TryOnClient,
    ui: UiConfig,
}

impl TryOnPipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            uploads: UploadManager::new(config)?,
            backend: TryOnClient::new(config.backend.clone()),
            ui: config.ui.clone(),
        })
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    pub fn backend(&self) -> &TryOnClient {
        &self.backend
    }

    pub async fn run(
        &self,
        subject: &Path,
        clothing: &Path,
        status: Option<StatusSender>,
    ) -> Result<TryOnOutcome> {
        let outcome = self.run_inner(subject, clothing, &status).await;

        if let Err(e) = &outcome {
            send(&status, PipelineStatus::Failed {
                message: e.to_string(),
            });
        }
        outcome
    }

    async fn run_inner(
        &self,
        subject: &Path,
        clothing: &Path,
        status: &Option<StatusSender>,
    ) -> Result<TryOnOutcome> {
        send(status, PipelineStatus::Validating);
        let subject_file = ImageFile::from_path(subject).await?;
        let clothing_file = ImageFile::from_path(clothing).await?;

        let mut pair = UploadedImagePair::new();

        // The second upload starts strictly after the first completes.
        let uploaded = self
            .upload_step(&subject_file, ImageKind::Subject, status)
            .await?;
        pair.set(ImageKind::Subject, uploaded.url);

        let uploaded = self
            .upload_step(&clothing_file, ImageKind::Clothing, status)
            .await?;
        pair.set(ImageKind::Clothing, uploaded.url);

        send(status, PipelineStatus::Requesting);
        let images = {
            let _timer = logger::timer("try-on generate");
            self.backend.generate(&pair).await?
        };

        let label = images.download_label();
        let note = images.summary_note();
        send(status, PipelineStatus::Done {
            label: label.clone(),
            note: note.clone(),
        });

        Ok(TryOnOutcome {
            pair,
            images,
            label,
            note,
        })
    }

    async fn upload_step(
        &self,
        file: &ImageFile,
        kind: ImageKind,
        status: &Option<StatusSender>,
    ) -> Result<UploadResult> {
        let status = match status {
            Some(status) if self.ui.show_progress => status.clone(),
            _ => return self.uploads.upload_image(file, kind).await,
        };

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let forward = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                match event {
                    UploadEvent::Progress(progress) => {
                        let _ = status.send(PipelineStatus::Uploading {
                            kind,
                            percent: progress.percent,
                        });
                    }
                    UploadEvent::Completed { .. } => {}
                    UploadEvent::Failed { message } => {
                        log::debug!("Upload attempt for {} failed: {}", kind, message);
                    }
                }
            }
        });

        let result = self
            .uploads
            .upload_image_with_progress(file, kind, events_tx)
            .await;

        // All senders are gone once the upload returns, so this drains the
        // remaining events before the next step begins.
        let _ = forward.await;
        result
    }

    /// Downloads every generated image into `dir` as `my-new-look-{n}.jpg`.
    /// A single image failing to load is logged and skipped, never fatal.
    pub async fn save_all(&self, images: &GeneratedImageSet, dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            crate::error::TryOnError::Read(format!(
                "Failed to create output directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let total = images.len();
        let mut saved = Vec::new();

        for (index, url) in images.urls().iter().enumerate() {
            log::info!("Saving look {}/{}", index + 1, total);
            let bytes = match self.backend.fetch_image(url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("Failed to load image {}: {}", index + 1, e);
                    continue;
                }
            };

            let path = dir.join(format!("my-new-look-{}.jpg", index + 1));
            match tokio::fs::write(&path, bytes).await {
                Ok(()) => saved.push(path),
                Err(e) => log::error!("Could not save image {}: {}", index + 1, e),
            }
        }

        Ok(saved)
    }
}

fn send(status: &Option<StatusSender>, update: PipelineStatus) {
    if let Some(status) = status {
        let _ = status.send(update);
    }
}
