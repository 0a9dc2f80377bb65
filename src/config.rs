use std::env;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub enabled: bool,
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub folder: Option<String>,
    pub quality: Option<String>,
    pub fetch_format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomBackendConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImgurConfig {
    pub enabled: bool,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub allowed_types: Vec<String>,
    pub max_file_size: u64,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub show_progress: bool,
    pub show_uploaded_url: bool,
}

#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_uploads: bool,
    pub log_errors: bool,
    pub log_validation: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub cloudinary: CloudinaryConfig,
    pub custom_backend: CustomBackendConfig,
    pub imgur: ImgurConfig,
    pub validation: ValidationConfig,
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub debug: DebugConfig,
    pub output_dir: Option<String>,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        CloudinaryConfig {
            enabled: false,
            cloud_name: None,
            upload_preset: None,
            folder: None,
            quality: None,
            fetch_format: None,
        }
    }
}

impl CloudinaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok();
        let upload_preset = env::var("CLOUDINARY_UPLOAD_PRESET").ok();
        let folder = env::var("CLOUDINARY_FOLDER").ok();
        let enabled = cloud_name.is_some() && upload_preset.is_some();

        CloudinaryConfig {
            enabled,
            cloud_name,
            upload_preset,
            folder,
            quality: Some("auto".to_string()),
            fetch_format: Some("auto".to_string()),
        }
    }

    pub fn with_credentials(
        mut self,
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Self {
        self.cloud_name = Some(cloud_name.into());
        self.upload_preset = Some(upload_preset.into());
        self.enabled = true;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// True only when the credentials are present and are not the
    /// placeholder values shipped in sample configuration.
    pub fn is_configured(&self) -> bool {
        self.enabled
            && self
                .cloud_name
                .as_deref()
                .map_or(false, |n| !n.is_empty() && n != "YOUR_CLOUD_NAME")
            && self
                .upload_preset
                .as_deref()
                .map_or(false, |p| !p.is_empty() && p != "YOUR_UPLOAD_PRESET")
    }
}

impl Default for CustomBackendConfig {
    fn default() -> Self {
        CustomBackendConfig {
            enabled: false,
            endpoint: None,
        }
    }
}

impl CustomBackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint = env::var("UPLOAD_ENDPOINT").ok();

        CustomBackendConfig {
            enabled: endpoint.is_some(),
            endpoint,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self.enabled = true;
        self
    }
}

impl Default for ImgurConfig {
    fn default() -> Self {
        ImgurConfig {
            enabled: false,
            client_id: None,
        }
    }
}

impl ImgurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let client_id = env::var("IMGUR_CLIENT_ID").ok();

        ImgurConfig {
            enabled: client_id.is_some(),
            client_id,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.enabled = true;
        self
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_width: 100,
            min_height: 100,
            max_width: 4000,
            max_height: 4000,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_allowed_types(mut self, allowed_types: Vec<String>) -> Self {
        self.allowed_types = allowed_types;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            endpoint: "http://127.0.0.1:8100/output".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint = env::var("TRYON_BACKEND_URL")
            .unwrap_or_else(|_| Self::default().endpoint);

        BackendConfig { endpoint }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_progress: true,
            show_uploaded_url: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            enabled: false,
            log_uploads: true,
            log_errors: true,
            log_validation: false,
        }
    }
}

impl DebugConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("TRYON_DEBUG").ok().map_or(false, |v| v == "true");

        DebugConfig {
            enabled,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cloudinary: CloudinaryConfig::default(),
            custom_backend: CustomBackendConfig::default(),
            imgur: ImgurConfig::default(),
            validation: ValidationConfig::default(),
            backend: BackendConfig::default(),
            ui: UiConfig::default(),
            debug: DebugConfig::default(),
            output_dir: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            cloudinary: CloudinaryConfig::from_env(),
            custom_backend: CustomBackendConfig::from_env(),
            imgur: ImgurConfig::from_env(),
            validation: ValidationConfig::default(),
            backend: BackendConfig::from_env(),
            ui: UiConfig::default(),
            debug: DebugConfig::from_env(),
            output_dir: env::var("TRYON_OUTPUT_DIR").ok(),
        }
    }

    pub fn with_cloudinary(mut self, config: CloudinaryConfig) -> Self {
        self.cloudinary = config;
        self
    }

    pub fn with_custom_backend(mut self, config: CustomBackendConfig) -> Self {
        self.custom_backend = config;
        self
    }

    pub fn with_imgur(mut self, config: ImgurConfig) -> Self {
        self.imgur = config;
        self
    }

    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }

    pub fn with_backend(mut self, config: BackendConfig) -> Self {
        self.backend = config;
        self
    }
}
