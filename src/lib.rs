pub mod backend;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod scroll;
pub mod upload;

pub use backend::TryOnClient;
pub use config::{
    BackendConfig, CloudinaryConfig, Config, CustomBackendConfig, DebugConfig, ImgurConfig,
    UiConfig, ValidationConfig,
};
pub use error::{Result, TryOnError};
pub use models::*;
pub use pipeline::{PipelineStatus, StatusSender, TryOnOutcome, TryOnPipeline};
pub use upload::{
    format_file_size, validate_image_file, CloudinaryHost, CustomBackendHost, DataUrlHost,
    DeliveryOptions, ImageHost, ImgurHost, UploadManager,
};
