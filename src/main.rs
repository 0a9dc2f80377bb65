use std::env;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tryon::{Config, ImageKind, PipelineStatus, TryOnPipeline};

fn usage() -> ! {
    eprintln!("Usage: tryon <subject-photo> <clothing-photo> [output-dir]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let config = Config::from_env();

    let logger_config = if config.debug.enabled {
        tryon::logger::LoggerConfig::development()
    } else {
        tryon::logger::LoggerConfig::default()
    };
    tryon::logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let mut args = env::args().skip(1);
    let subject = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            log::error!("Please upload your photo first.");
            usage();
        }
    };
    let clothing = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            log::error!("Please upload a clothing item first.");
            usage();
        }
    };
    let output_dir = args
        .next()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| ".".to_string());

    log::info!("🪞 Try-on backend: {}", config.backend.endpoint);

    let pipeline = TryOnPipeline::new(&config)?;

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        let mut statuses = UnboundedReceiverStream::new(status_rx);
        while let Some(status) = statuses.next().await {
            match status {
                PipelineStatus::Validating => log::info!("Checking selected photos..."),
                PipelineStatus::Uploading { kind, percent } => match kind {
                    ImageKind::Subject => {
                        log::info!("Uploading photo... {}%", percent.round())
                    }
                    ImageKind::Clothing => {
                        log::info!("Uploading clothing... {}%", percent.round())
                    }
                },
                PipelineStatus::Requesting => log::info!("Sending to try-on service..."),
                PipelineStatus::Done { note, .. } => log::info!("{}", note),
                PipelineStatus::Failed { message } => {
                    log::error!("Try-on processing failed: {}. Please try again.", message)
                }
            }
        }
    });

    let outcome = pipeline.run(&subject, &clothing, Some(status_tx)).await;
    let _ = printer.await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(_) => std::process::exit(1),
    };

    if config.ui.show_uploaded_url {
        if let Some(url) = &outcome.pair.subject_image_url {
            log::info!("📤 Subject image URL: {}", url);
        }
        if let Some(url) = &outcome.pair.clothing_image_url {
            log::info!("📤 Clothing image URL: {}", url);
        }
    }

    let saved = pipeline
        .save_all(&outcome.images, &PathBuf::from(&output_dir))
        .await?;
    for path in &saved {
        log::info!("💾 Saved: {}", path.display());
    }
    log::info!("💾 {}", outcome.label);

    Ok(())
}
