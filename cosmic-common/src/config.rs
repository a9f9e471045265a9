//! Configuration loading
//!
//! Settings are resolved in this priority order:
//! 1. Command-line arguments (applied by the binary after loading)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error: a warning is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "cosmic-astrology";

/// Resolved service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server port
    pub port: u16,
    /// Bind address
    pub host: String,
    /// Allowed CORS origin (`*` for any)
    pub cors_origin: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Local upload directory; defaults to `<static_dir>/uploads`
    pub upload_dir: Option<PathBuf>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
    /// Admin password used when the credentials table has no row
    pub admin_password: Option<String>,
    pub supabase: SupabaseConfig,
    pub email: EmailConfig,
    pub openai: OpenAiConfig,
    pub background_removal: BackgroundRemovalConfig,
    pub logging: LoggingConfig,
}

/// Hosted backend (Supabase) connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub storage_bucket: String,
    pub timeout_secs: u64,
}

/// SMTP settings for lead notifications
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    /// Admin address notified of new bookings
    pub booking_notification: Option<String>,
    /// Admin address notified of new contact messages
    pub contact_notification: Option<String>,
}

/// Chat-completion (LLM) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
}

/// Segmentation backends used for background removal
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackgroundRemovalConfig {
    /// ISNet-style ONNX model run in process (needs the `onnx` feature)
    pub model_path: Option<PathBuf>,
    /// Remote segmentation service
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origin: "*".to_string(),
            static_dir: PathBuf::from("static"),
            upload_dir: None,
            max_file_size: 10 * 1024 * 1024,
            admin_password: None,
            supabase: SupabaseConfig::default(),
            email: EmailConfig::default(),
            openai: OpenAiConfig::default(),
            background_removal: BackgroundRemovalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            storage_bucket: "astrology".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: None,
            password: None,
            from: None,
            booking_notification: None,
            contact_notification: None,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4".to_string(),
        }
    }
}

impl Default for BackgroundRemovalConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            endpoint: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SupabaseConfig {
    /// Both URL and key are present
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EmailConfig {
    /// Credentials and sender address are present
    pub fn is_configured(&self) -> bool {
        self.user.is_some() && self.password.is_some() && self.from.is_some()
    }
}

impl OpenAiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl BackgroundRemovalConfig {
    /// A model file or a service endpoint is set
    pub fn is_configured(&self) -> bool {
        self.model_path.is_some() || self.endpoint.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from a TOML file, then overlay environment variables.
    ///
    /// `path` overrides the platform default location. A missing file
    /// falls back to compiled defaults with a warning.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut settings = match path {
            Some(ref p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Read {} failed: {}", p.display(), e)))?;
                info!("Loaded configuration from {}", p.display());
                Self::from_toml_str(&content)?
            }
            Some(ref p) => {
                warn!("Config file {} not found, using defaults", p.display());
                Self::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };

        settings.apply_env();
        Ok(settings)
    }

    /// Parse settings from TOML text (missing keys take defaults)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Overlay process environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup (blank values are ignored)
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(port) = get("PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("CORS_ORIGIN") {
            self.cors_origin = v;
        }
        if let Some(v) = get("STATIC_DIR") {
            self.static_dir = PathBuf::from(v);
        }
        if let Some(v) = get("UPLOAD_DIR") {
            self.upload_dir = Some(PathBuf::from(v));
        }
        if let Some(size) = get("MAX_FILE_SIZE") {
            match size.parse() {
                Ok(s) => self.max_file_size = s,
                Err(_) => warn!("Ignoring invalid MAX_FILE_SIZE value: {}", size),
            }
        }
        if let Some(v) = get("ADMIN_PASSWORD") {
            self.admin_password = Some(v);
        }

        if let Some(v) = get("SUPABASE_URL") {
            self.supabase.url = Some(v);
        }
        if let Some(v) = get("SUPABASE_KEY") {
            self.supabase.key = Some(v);
        }
        if let Some(v) = get("SUPABASE_STORAGE_BUCKET") {
            self.supabase.storage_bucket = v;
        }

        if let Some(v) = get("EMAIL_HOST") {
            self.email.host = v;
        }
        if let Some(port) = get("EMAIL_PORT") {
            match port.parse() {
                Ok(p) => self.email.port = p,
                Err(_) => warn!("Ignoring invalid EMAIL_PORT value: {}", port),
            }
        }
        if let Some(v) = get("EMAIL_USER") {
            self.email.user = Some(v);
        }
        if let Some(v) = get("EMAIL_PASSWORD") {
            self.email.password = Some(v);
        }
        if let Some(v) = get("EMAIL_FROM") {
            self.email.from = Some(v);
        }
        if let Some(v) = get("BOOKING_NOTIFICATION_EMAIL") {
            self.email.booking_notification = Some(v);
        }
        if let Some(v) = get("CONTACT_NOTIFICATION_EMAIL") {
            self.email.contact_notification = Some(v);
        }

        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.openai.model = v;
        }

        if let Some(v) = get("BG_REMOVAL_MODEL") {
            self.background_removal.model_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("BG_REMOVAL_ENDPOINT") {
            self.background_removal.endpoint = Some(v);
        }
        if let Some(v) = get("BG_REMOVAL_API_KEY") {
            self.background_removal.api_key = Some(v);
        }

        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Effective local upload directory
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| self.static_dir.join("uploads"))
    }
}

/// Platform default config file path (`~/.config/cosmic-astrology/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.max_file_size, 10 * 1024 * 1024);
        assert_eq!(settings.supabase.storage_bucket, "astrology");
        assert_eq!(settings.openai.model, "gpt-4");
        assert_eq!(settings.upload_dir(), PathBuf::from("static").join("uploads"));
        assert!(!settings.supabase.is_configured());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            port = 8080

            [supabase]
            url = "https://example.supabase.co"
            key = "anon"
            "#,
        )
        .unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, "0.0.0.0");
        assert!(settings.supabase.is_configured());
        assert_eq!(settings.supabase.storage_bucket, "astrology");
        assert_eq!(settings.supabase.timeout_secs, 30);
        assert_eq!(settings.email.port, 587);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Settings::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides_toml() {
        let mut settings = Settings::from_toml_str("port = 8080").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "9090"),
            ("SUPABASE_URL", "https://env.supabase.co"),
            ("SUPABASE_KEY", "service"),
            ("MAX_FILE_SIZE", "1024"),
            ("UPLOAD_DIR", "/tmp/uploads"),
            ("OPENAI_API_KEY", "  "),
            ("BG_REMOVAL_MODEL", "/models/isnet-fp16.onnx"),
        ]);

        settings.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.max_file_size, 1024);
        assert_eq!(settings.upload_dir(), PathBuf::from("/tmp/uploads"));
        assert!(settings.supabase.is_configured());
        // Blank values are ignored
        assert!(!settings.openai.is_configured());
        assert_eq!(
            settings.background_removal.model_path,
            Some(PathBuf::from("/models/isnet-fp16.onnx"))
        );
        assert!(settings.background_removal.is_configured());
    }

    #[test]
    fn test_invalid_env_number_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_env_with(|k| (k == "PORT").then(|| "abc".to_string()));
        assert_eq!(settings.port, 3000);
    }
}
