use crate::error::{FaceGateError, Result};
use crate::gate::AdminPredicate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default = "default_device_index")]
    pub device_index: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_warmup_frames")]
    pub warmup_frames: u32,
    #[serde(default = "default_warmup_delay")]
    pub warmup_delay_ms: u64,
}

fn default_device_index() -> u32 { 0 }
fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }
fn default_warmup_frames() -> u32 { 3 }
fn default_warmup_delay() -> u64 { 50 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: default_device_index(),
            width: default_width(),
            height: default_height(),
            warmup_frames: default_warmup_frames(),
            warmup_delay_ms: default_warmup_delay(),
        }
    }
}

/// Batch size and cadence are fixed configuration, never derived at runtime.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LivenessConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_batch_size() -> usize { 5 }
fn default_sample_interval() -> u64 { 200 }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay() -> u64 { 500 }

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sample_interval_ms: default_sample_interval(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_request_timeout() -> u64 { 30 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_predicate")]
    pub predicate: AdminPredicate,
}

fn default_predicate() -> AdminPredicate {
    AdminPredicate::Contains("faceauth.com".to_string())
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { predicate: default_predicate() }
    }
}

impl Config {
    /// Load from the default location, falling back to built-in defaults
    /// when no config file is present.
    pub fn load() -> Result<Self> {
        let path = Path::new("configs/facegate.toml");
        if path.exists() {
            Self::load_from_path(path)
        } else {
            tracing::debug!("no config file at {}, using built-in defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        tracing::debug!("loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| FaceGateError::Other(anyhow::anyhow!("config parse error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.width > 4096 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Camera width must be between 1 and 4096, got {}", self.camera.width
            )));
        }
        if self.camera.height == 0 || self.camera.height > 4096 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Camera height must be between 1 and 4096, got {}", self.camera.height
            )));
        }

        if self.liveness.batch_size == 0 || self.liveness.batch_size > 25 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Liveness batch size must be between 1 and 25, got {}", self.liveness.batch_size
            )));
        }
        if self.liveness.sample_interval_ms > 5000 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Sample interval must be at most 5000 ms, got {}", self.liveness.sample_interval_ms
            )));
        }
        if self.liveness.max_attempts == 0 || self.liveness.max_attempts > 10 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Max attempts must be between 1 and 10, got {}", self.liveness.max_attempts
            )));
        }
        if self.liveness.retry_delay_ms > 10_000 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Retry delay must be at most 10000 ms, got {}", self.liveness.retry_delay_ms
            )));
        }

        if self.backend.base_url.trim().is_empty() {
            return Err(FaceGateError::Other(anyhow::anyhow!("Backend base URL must not be empty")));
        }
        if self.backend.request_timeout_secs == 0 || self.backend.request_timeout_secs > 300 {
            return Err(FaceGateError::Other(anyhow::anyhow!(
                "Request timeout must be between 1 and 300 seconds, got {}",
                self.backend.request_timeout_secs
            )));
        }

        Ok(())
    }
}
