//! Core functionality for keying logo backgrounds and maintaining a logo pack.
//!
//! This library provides:
//! - Background keying: palette colors within a distance threshold become transparent
//! - Logo pack discovery and naming-convention categories
//! - Pack building (on-dark copies, transparent wordmarks, mono variants)
//! - Frontend asset sync and verification

// -- External Dependencies --
use log::info;

// -- Standard Library --
use std::path::Path;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use keyer::{key_batch, key_file, key_image, remove_background, BatchOptions, KeyJob};
pub use palette::{NamedColor, Palette, Rgb, Threshold, DEFAULT_THRESHOLD};
pub use types::*;

// -- Public Modules --
pub mod analysis;
pub mod config;
pub mod discovery;
pub mod keyer;
pub mod logging;
pub mod pack;
pub mod palette;
pub mod sync;
pub mod types;

/// Main entry point binding a configuration to the pack operations
pub struct LogoKeyer {
    config: Config,
    palette: Palette,
    threshold: Threshold,
}

impl LogoKeyer {
    /// Create a new LogoKeyer, validating the configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let palette = config.palette()?;
        let threshold = config.threshold()?;

        Ok(Self {
            config,
            palette,
            threshold,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Key a single file, writing to `destination` (or over the source)
    pub fn remove_background_file(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<KeyOutcome> {
        key_file(
            source,
            destination.unwrap_or(source),
            &self.palette,
            self.threshold,
        )
    }

    /// Key several files with the configured palette, reporting per file
    pub fn remove_backgrounds(&self, jobs: &[KeyJob], progress: bool) -> Result<Vec<FileReport>> {
        info!("Keying {} files", jobs.len());
        key_batch(
            jobs,
            &self.palette,
            self.threshold,
            BatchOptions {
                threads: self.config.threads,
                skip_missing: false,
                progress,
            },
        )
    }

    /// Key the configured icon files in the pack directory
    pub fn fix_icons(&self) -> Result<Vec<FileReport>> {
        pack::fix_icons(&self.config)
    }

    /// Analyze every logo file in the pack directory
    pub fn analyze(&self) -> Result<Vec<analysis::LogoAnalysis>> {
        analysis::analyze_dir(&self.config.logo_dir, &self.config)
    }

    /// Build the pro asset pack
    pub fn build_pack(&self) -> Result<pack::PackReport> {
        info!("Building logo pack in {}", self.config.logo_dir.display());
        pack::build_pack(&self.config)
    }

    /// Mirror pack files into the frontend
    pub fn sync_assets(&self) -> Result<Vec<sync::SyncReport>> {
        sync::sync_assets(&self.config)
    }

    /// Overwrite the frontend copies, e.g. right after keying the icons
    pub fn copy_assets(&self) -> Result<Vec<sync::SyncReport>> {
        sync::copy_assets(&self.config)
    }

    /// Check the frontend copies
    pub fn verify_assets(&self) -> Vec<sync::VerifyReport> {
        sync::verify_assets(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(LogoKeyer::new(config), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_remove_background_file_defaults_to_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ios_76.png");
        RgbaImage::from_pixel(3, 2, Rgba([13, 13, 13, 255]))
            .save(&path)
            .unwrap();

        let keyer = LogoKeyer::new(Config::default()).unwrap();
        let outcome = keyer.remove_background_file(&path, None).unwrap();

        assert_eq!(outcome.converted, 6);
        assert_eq!(outcome.destination, path);
        let reread = image::open(&path).unwrap().to_rgba8();
        assert!(reread.pixels().all(|p| p.0 == [13, 13, 13, 0]));
    }
}
