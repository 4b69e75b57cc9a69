use image::{DynamicImage, GenericImageView};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::discovery::{discover_logos, file_name};
use crate::error::Result;
use crate::types::ColorMode;

/// App-icon name fragments that must ship with a transparent background
const ICON_MARKERS: [&str; 5] = ["favicon", "ios", "android", "pwa", "maskable"];

/// Decoded properties of a logo file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProperties {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
    /// At least one pixel is not fully opaque
    pub transparent: bool,
    /// Name suggests a wordmark (`full`, `branding`)
    pub has_title: bool,
    /// App icon that still has an opaque background
    pub needs_fix: bool,
}

/// Analysis of one file; decode failures are kept rather than aborting the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoAnalysis {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub result: std::result::Result<ImageProperties, String>,
}

impl LogoAnalysis {
    pub fn needs_fix(&self) -> bool {
        matches!(&self.result, Ok(props) if props.needs_fix)
    }
}

/// Whether the image has an alpha channel with at least one non-opaque pixel
pub fn has_transparency(image: &DynamicImage) -> bool {
    match image {
        DynamicImage::ImageRgba8(buffer) => buffer.pixels().any(|p| p.0[3] < 255),
        DynamicImage::ImageLumaA8(buffer) => buffer.pixels().any(|p| p.0[1] < 255),
        other if other.color().has_alpha() => other.to_rgba8().pixels().any(|p| p.0[3] < 255),
        _ => false,
    }
}

/// Decode and classify a single logo file
pub fn analyze_file(path: &Path) -> LogoAnalysis {
    let name = file_name(path);
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    let result = match image::open(path) {
        Ok(image) => {
            let (width, height) = image.dimensions();
            let transparent = has_transparency(&image);
            let lower = name.to_lowercase();

            let props = ImageProperties {
                width,
                height,
                mode: ColorMode::from(image.color()),
                transparent,
                has_title: lower.contains("full") || lower.contains("branding"),
                needs_fix: !transparent && ICON_MARKERS.iter().any(|m| lower.contains(m)),
            };
            debug!("Analyzed {}: {:?}", path.display(), props);
            Ok(props)
        }
        Err(e) => {
            warn!("Failed to open {} ({})", path.display(), e);
            Err(e.to_string())
        }
    };

    LogoAnalysis {
        path: path.to_path_buf(),
        name,
        size,
        result,
    }
}

/// Analyze every discovered file in the pack directory
pub fn analyze_dir(directory: &Path, config: &Config) -> Result<Vec<LogoAnalysis>> {
    let files = discover_logos(directory, config)?;
    Ok(files.iter().map(|f| analyze_file(&f.path)).collect())
}
