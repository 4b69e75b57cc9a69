use image::ColorType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Logo file formats found in a pack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Ico,
    Other(String),
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "ico" => Self::Ico,
            other => Self::Other(other.to_string()),
        }
    }

    /// Check if format is part of a logo pack
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Png | Self::Ico => true,
            Self::Other(_) => false,
        }
    }
}

/// Pixel layout of a decoded image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    L,
    La,
    Rgb,
    Rgba,
    Other(String),
}

impl ColorMode {
    /// Whether the layout carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::La | Self::Rgba)
    }
}

impl From<ColorType> for ColorMode {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::L8 => Self::L,
            ColorType::La8 => Self::La,
            ColorType::Rgb8 => Self::Rgb,
            ColorType::Rgba8 => Self::Rgba,
            other => Self::Other(format!("{:?}", other)),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L => write!(f, "L"),
            Self::La => write!(f, "LA"),
            Self::Rgb => write!(f, "RGB"),
            Self::Rgba => write!(f, "RGBA"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Naming-convention class of a pack asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// favicon, iOS, Android, PWA, maskable and splash icons
    IconOnly,
    /// Logo plus wordmark on a transparent background
    Wordmark,
    /// Logo plus wordmark keeping its dark background
    WordmarkOnDark,
    /// mono_black / mono_white
    Monochrome,
    /// Adaptive Android layers and the .ico favicon
    Special,
    Uncategorized,
}

impl Category {
    /// Summary order
    pub const ALL: [Category; 6] = [
        Category::IconOnly,
        Category::Wordmark,
        Category::WordmarkOnDark,
        Category::Monochrome,
        Category::Special,
        Category::Uncategorized,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::IconOnly => "Icon Only (transparent)",
            Self::Wordmark => "Logo + Wordmark (transparent)",
            Self::WordmarkOnDark => "Logo + Wordmark (on dark bg)",
            Self::Monochrome => "Monochrome (transparent)",
            Self::Special => "Special",
            Self::Uncategorized => "Uncategorized",
        }
    }
}

/// Representation of a discovered logo file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoFile {
    /// Full path to the logo file
    pub path: PathBuf,

    /// File size in bytes
    pub size: u64,

    /// Image format
    pub format: ImageFormat,

    /// Every category the file name matches
    pub categories: Vec<Category>,
}

impl LogoFile {
    pub fn file_name(&self) -> String {
        crate::discovery::file_name(&self.path)
    }
}

/// Outcome of keying one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Pixels turned transparent by this pass
    pub converted: usize,
}

/// Per-file status line for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileStatus {
    Keyed(KeyOutcome),
    /// Source file was not present; not an error
    Skipped,
    Failed(String),
}

/// Result of handling one file in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_error(&self) -> bool {
        matches!(self.status, FileStatus::Failed(_))
    }
}
