use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::{Category, ImageFormat, LogoFile};

/// Discover logo files in the pack directory, PNGs first, each group sorted by name
pub fn discover_logos(directory: &Path, config: &Config) -> Result<Vec<LogoFile>> {
    // Check if directory exists
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    let max_depth = config.max_depth.unwrap_or(usize::MAX);

    let mut logo_files = Vec::new();

    for entry in WalkDir::new(directory)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();

        let format = match get_image_format(path) {
            Some(format) if format.is_supported() => format,
            _ => continue,
        };

        match fs::metadata(path) {
            Ok(metadata) => logo_files.push(LogoFile {
                path: path.to_path_buf(),
                size: metadata.len(),
                format,
                categories: categorize(&file_name(path)),
            }),
            Err(e) => {
                // Log error but continue with other files
                log_file_error(path, "metadata", &e);
            }
        }
    }

    // Stable: keeps name order within each format
    logo_files.sort_by_key(|f| f.format != ImageFormat::Png);

    Ok(logo_files)
}

/// Categories a pack file name belongs to, in summary order
pub fn categorize(file_name: &str) -> Vec<Category> {
    let name = file_name.to_lowercase();
    let png = name.ends_with(".png");

    let mut categories = Vec::new();

    const ICON_PREFIXES: [&str; 6] = [
        "favicon_",
        "ios_",
        "android_",
        "pwa_",
        "maskable_icon_",
        "splash_logo_",
    ];
    if png && ICON_PREFIXES.iter().any(|p| name.starts_with(p)) {
        categories.push(Category::IconOnly);
    }

    if png {
        if let Some(rest) = name.strip_prefix("logo-with-title-") {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                categories.push(Category::Wordmark);
            }
        }
        if name.starts_with("logo-with-title-on-dark-") {
            categories.push(Category::WordmarkOnDark);
        }
    }

    if name == "mono_black.png" || name == "mono_white.png" {
        categories.push(Category::Monochrome);
    }

    if (png && name.starts_with("android_adaptive_")) || name == "favicon.ico" {
        categories.push(Category::Special);
    }

    if categories.is_empty() {
        categories.push(Category::Uncategorized);
    }

    categories
}

/// Get image format from file extension
fn get_image_format(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(ImageFormat::from_extension)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn create_dummy(dir: &Path, name: &str) -> PathBuf {
        let file_path = dir.join(name);
        let mut file = File::create(&file_path).unwrap();
        // Discovery never decodes, so dummy data is enough
        file.write_all(b"DUMMY IMAGE DATA").unwrap();
        file_path
    }

    fn setup_pack() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("old");
        fs::create_dir(&subdir).unwrap();

        for name in [
            "pwa_256.png",
            "favicon.ico",
            "favicon_128.png",
            "mono_black.png",
            "notes.txt",
        ] {
            create_dummy(dir.path(), name);
        }
        create_dummy(&subdir, "favicon_16.png");

        dir
    }

    #[test]
    fn test_discover_logos_order_and_filter() {
        let dir = setup_pack();
        let discovered = discover_logos(dir.path(), &Config::default()).unwrap();

        let names: Vec<String> = discovered.iter().map(LogoFile::file_name).collect();
        assert_eq!(
            names,
            vec!["favicon_128.png", "mono_black.png", "pwa_256.png", "favicon.ico"]
        );
        assert_eq!(discovered[0].size, 16);
    }

    #[test]
    fn test_logo_file_name_matches_helper() {
        for path in ["pack/ios_76.png", "favicon.ico", "/"] {
            let logo = LogoFile {
                path: PathBuf::from(path),
                size: 0,
                format: ImageFormat::Png,
                categories: Vec::new(),
            };
            assert_eq!(logo.file_name(), file_name(Path::new(path)));
        }
        assert_eq!(file_name(Path::new("/")), "");
    }

    #[test]
    fn test_discover_logos_with_depth() {
        let dir = setup_pack();
        let config = Config {
            max_depth: None,
            ..Default::default()
        };
        let discovered = discover_logos(dir.path(), &config).unwrap();
        assert_eq!(discovered.len(), 5);
    }

    #[test]
    fn test_discover_logos_nonexistent_directory() {
        let result = discover_logos(Path::new("/path/that/does/not/exist"), &Config::default());
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("favicon_32.png"), vec![Category::IconOnly]);
        assert_eq!(categorize("maskable_icon_1024.png"), vec![Category::IconOnly]);
        assert_eq!(categorize("logo-with-title-512.png"), vec![Category::Wordmark]);
        assert_eq!(
            categorize("logo-with-title-on-dark-512.png"),
            vec![Category::WordmarkOnDark]
        );
        assert_eq!(categorize("mono_white.png"), vec![Category::Monochrome]);
        assert_eq!(categorize("favicon.ico"), vec![Category::Special]);
        assert_eq!(
            categorize("android_adaptive_background.png"),
            vec![Category::IconOnly, Category::Special]
        );
        assert_eq!(categorize("mono_black-on-dark.png"), vec![Category::Uncategorized]);
        assert_eq!(categorize("logo-with-title-transparent.png"), vec![Category::Uncategorized]);
    }
}
