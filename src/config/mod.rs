// ABOUTME: Process environment settings for gpurent.
// ABOUTME: Snapshots SSH key defaults and marketplace endpoint configuration.

use crate::error::{Result, ToolError};
use std::path::PathBuf;

pub const SSH_KEY_PATH_VAR: &str = "SSH_PRIVATE_KEY_PATH";
pub const MARKET_URL_VAR: &str = "GPU_MARKET_URL";
pub const MARKET_API_KEY_VAR: &str = "GPU_MARKET_API_KEY";

/// Process-wide defaults, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Default private key path from `SSH_PRIVATE_KEY_PATH`.
    pub key_path: Option<PathBuf>,
    /// Home directory, used for `~` expansion and the key fallback path.
    pub home: Option<PathBuf>,
    /// Marketplace API base URL.
    pub market_url: Option<String>,
    /// Marketplace API key.
    pub market_api_key: Option<String>,
}

impl Settings {
    /// Snapshot the relevant process environment.
    pub fn from_env() -> Self {
        Self {
            key_path: std::env::var_os(SSH_KEY_PATH_VAR).map(PathBuf::from),
            home: std::env::var_os("HOME").map(PathBuf::from),
            market_url: std::env::var(MARKET_URL_VAR).ok(),
            market_api_key: std::env::var(MARKET_API_KEY_VAR).ok(),
        }
    }

    /// Marketplace base URL, required for rental operations.
    pub fn market_url(&self) -> Result<&str> {
        self.market_url.as_deref().ok_or_else(|| ToolError::MissingEnv {
            name: MARKET_URL_VAR.to_string(),
        })
    }

    /// Marketplace API key, required for rental operations.
    pub fn market_api_key(&self) -> Result<&str> {
        self.market_api_key.as_deref().ok_or_else(|| ToolError::MissingEnv {
            name: MARKET_API_KEY_VAR.to_string(),
        })
    }
}
