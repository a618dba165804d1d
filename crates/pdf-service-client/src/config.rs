use std::path::Path;

use pdf_fields::DEFAULT_RENDER_DPI;
use serde::{Deserialize, Serialize};

use crate::types::*;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Where the PDF service lives and how its page images are rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Resolution the service renders page images at
    pub render_dpi: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            render_dpi: DEFAULT_RENDER_DPI,
        }
    }
}

impl ServiceConfig {
    /// Load a config from a JSON file. Missing keys take their default.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("Service URL is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "Service URL must start with http:// or https://, got {}",
                url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "Timeout must be at least one second".to_string(),
            ));
        }
        if self.render_dpi.is_nan() || self.render_dpi <= 0.0 {
            return Err(ClientError::Config(format!(
                "Render resolution must be positive, got {}",
                self.render_dpi
            )));
        }
        Ok(())
    }
}
