//! Configuration management for slidekit

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paging::{PageStyle, PeriodStyle};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub footer: FooterConfig,
    pub images: ImageConfig,
    pub autosave: AutosaveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub page_label: String,
    pub period: PeriodStyle,
}

/// How inserted image files end up in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMode {
    /// Copied into the image folder and referenced by relative path
    External,
    /// Inlined as a base64 data URI
    Embed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub folder: String,
    pub mode: ImageMode,
    pub max_embed_bytes: u64,
    pub allow_remote: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            page_label: "page".to_string(),
            period: PeriodStyle::Iso,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            folder: "images/".to_string(),
            mode: ImageMode::External,
            max_embed_bytes: 1024 * 1024,
            allow_remote: true,
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

impl FooterConfig {
    /// Footer wording for the renumbering pass
    pub fn page_style(&self) -> PageStyle {
        PageStyle {
            label: self.page_label.clone(),
            period: self.period,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "slidekit")
            .map(|proj_dirs| proj_dirs.config_dir().join("slidekit.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.images.max_embed_bytes == 0 && config.images.mode == ImageMode::Embed {
            warn!("images.max_embed_bytes is 0, every embedded image will be stored externally");
        }

        Ok(config)
    }
}
