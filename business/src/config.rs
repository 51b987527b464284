//! User configuration (`config.toml`).
//!
//! Every field has a default, so a missing file, a missing section or a missing key all
//! fall back to the built-in values.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    batch::DEFAULT_BATCH_WIDTH,
    color::QrColor,
    decoding::ScanConfig,
    encoding::{EncodeOptions, ErrorCorrection},
    generation::DEFAULT_DEBOUNCE,
    history::DEFAULT_HISTORY_LIMIT,
    logo::{DEFAULT_LOGO_PADDING, DEFAULT_LOGO_PERCENT, DEFAULT_LOGO_WIDTH},
    preview::DEFAULT_PREVIEW_SIZES,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: u32,
    pub dark: QrColor,
    pub light: QrColor,
    pub error_correction: ErrorCorrection,
    pub debounce_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let options = EncodeOptions::default();
        Self {
            width: options.width,
            dark: options.dark,
            light: options.light,
            error_correction: options.error_correction,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub sizes: Vec<u32>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_PREVIEW_SIZES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub width: u32,
    /// How many generated codes the batch panel shows.
    pub display_limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BATCH_WIDTH,
            display_limit: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub width: u32,
    pub size_percent: u32,
    pub padding: u32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_LOGO_WIDTH,
            size_percent: DEFAULT_LOGO_PERCENT,
            padding: DEFAULT_LOGO_PADDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    pub generation: GenerationConfig,
    pub preview: PreviewConfig,
    pub batch: BatchConfig,
    pub logo: LogoConfig,
    pub history: HistoryConfig,
    pub scanner: ScanConfig,
}

impl QrConfig {
    /// `config.toml` in the platform config directory.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("dev", "qrkit", "qr-studio")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads the configuration at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Options the simple and preview sessions start with.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            width: EncodeOptions::clamp_width(self.generation.width),
            dark: self.generation.dark,
            light: self.generation.light,
            error_correction: self.generation.error_correction,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.generation.debounce_ms)
    }
}
