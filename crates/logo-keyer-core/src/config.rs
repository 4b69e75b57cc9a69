use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::palette::{brand_presets, NamedColor, Palette, Threshold, DEFAULT_THRESHOLD};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Frontend copy of a pack file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppAsset {
    /// File name inside the frontend directories
    pub asset: String,

    /// File name inside the logo pack
    pub source: String,
}

impl AppAsset {
    pub fn new(asset: &str, source: &str) -> Self {
        Self {
            asset: asset.to_string(),
            source: source.to_string(),
        }
    }
}

/// Configuration for keying and pack maintenance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the exported logo pack
    pub logo_dir: PathBuf,

    /// Frontend source assets directory (created on sync)
    pub assets_dir: PathBuf,

    /// Frontend public directory (only updated if it exists)
    pub public_dir: PathBuf,

    /// Background colors to key out
    pub palette: Vec<NamedColor>,

    /// Maximum RGB distance from a palette color to count as background
    pub threshold: f64,

    /// Icon-only files keyed in place by `fix_icons`
    pub icon_files: Vec<String>,

    /// Pack files mirrored into the frontend
    pub app_assets: Vec<AppAsset>,

    /// Files checked by `verify_assets`
    pub verify_files: Vec<PathBuf>,

    /// Maximum directory depth for scanning the pack
    pub max_depth: Option<usize>,

    /// Number of threads for batch keying (0 = auto, 1 = sequential)
    pub threads: usize,

    /// Whether to report pack actions without touching the disk
    pub dry_run: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        let assets_dir = PathBuf::from("frontend/src/assets");
        let public_dir = PathBuf::from("frontend/public");

        Self {
            logo_dir: PathBuf::from("logo_exports"),
            verify_files: vec![
                assets_dir.join("logo-128.png"),
                assets_dir.join("logo-256.png"),
                public_dir.join("logo-128.png"),
                public_dir.join("logo-256.png"),
                public_dir.join("favicon.ico"),
            ],
            assets_dir,
            public_dir,
            palette: brand_presets(),
            threshold: DEFAULT_THRESHOLD,
            icon_files: default_icon_files(),
            app_assets: vec![
                AppAsset::new("logo-128.png", "favicon_128.png"),
                AppAsset::new("logo-256.png", "pwa_256.png"),
            ],
            max_depth: Some(1),
            threads: 1,
            dry_run: false,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.palette()?;
        self.threshold()?;

        if self.max_depth == Some(0) {
            return Err(Error::Configuration(
                "max_depth must be at least 1 to reach pack files".to_string(),
            ));
        }

        if let Some(dup) = self
            .palette
            .iter()
            .enumerate()
            .find(|(i, c)| self.palette[..*i].iter().any(|o| o.name == c.name))
        {
            return Err(Error::Configuration(format!(
                "Duplicate palette preset '{}'",
                dup.1.name
            )));
        }

        Ok(())
    }

    /// Palette built from the configured presets
    pub fn palette(&self) -> Result<Palette> {
        Palette::new(self.palette.clone())
    }

    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::new(self.threshold)
    }
}

fn default_icon_files() -> Vec<String> {
    [
        // Favicons
        "favicon_16.png",
        "favicon_32.png",
        "favicon_48.png",
        "favicon_64.png",
        "favicon_128.png",
        // iOS
        "ios_76.png",
        "ios_120.png",
        "ios_152.png",
        "ios_167.png",
        "ios_180.png",
        "ios_1024.png",
        // Android
        "android_48.png",
        "android_72.png",
        "android_96.png",
        "android_144.png",
        "android_192.png",
        "android_512.png",
        "android_adaptive_foreground.png",
        // PWA
        "pwa_192.png",
        "pwa_256.png",
        "pwa_384.png",
        "pwa_512.png",
        // Others
        "maskable_icon_1024.png",
        "splash_logo_1200.png",
        "mono_white.png",
        "mono_black.png",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
