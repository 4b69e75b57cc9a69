//! Keeping frontend copies of pack assets in step with the pack.

use image::GenericImageView;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_fs_modification;
use crate::types::ColorMode;

/// Dimensions and layout of an image on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
}

impl AssetInfo {
    /// Whether the layout can carry transparency
    pub fn has_alpha(&self) -> bool {
        self.mode.has_alpha()
    }
}

/// What happened to one frontend copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncAction {
    /// Pack source does not exist
    SourceMissing,
    /// Target was missing and has been copied
    Created,
    /// Target existed and has been replaced
    Updated,
    /// Target already matches
    Unchanged,
    Failed(String),
}

/// Result of syncing one asset into one target directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub asset: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub action: SyncAction,
    /// Final state of the target, when it could be read
    pub info: Option<AssetInfo>,
}

impl SyncReport {
    pub fn is_error(&self) -> bool {
        matches!(self.action, SyncAction::SourceMissing | SyncAction::Failed(_))
    }
}

/// Outcome of verifying one app asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyStatus {
    Ok(AssetInfo),
    NotFound,
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub status: VerifyStatus,
}

/// Read dimensions and color mode without keeping the pixels
pub fn read_info(path: &Path) -> Result<AssetInfo> {
    let image = image::open(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (width, height) = image.dimensions();
    Ok(AssetInfo {
        width,
        height,
        mode: ColorMode::from(image.color()),
    })
}

/// Mirror configured pack files into the frontend asset directories.
///
/// The primary assets directory is created if needed; the public directory
/// is only updated when it already exists. A target is copied when it is
/// missing or its size or mode differ. `favicon.ico` is copied into the
/// public directory as-is.
pub fn sync_assets(config: &Config) -> Result<Vec<SyncReport>> {
    mirror(config, false)
}

/// Like [`sync_assets`], but every target with a source is overwritten.
///
/// Used after keying, where a keyed icon keeps its size and mode.
pub fn copy_assets(config: &Config) -> Result<Vec<SyncReport>> {
    mirror(config, true)
}

fn mirror(config: &Config, force: bool) -> Result<Vec<SyncReport>> {
    fs::create_dir_all(&config.assets_dir)?;

    let mut targets = vec![config.assets_dir.clone()];
    if config.public_dir.is_dir() {
        targets.push(config.public_dir.clone());
    } else {
        warn!(
            "Public directory {} does not exist, skipping",
            config.public_dir.display()
        );
    }

    let mut reports = Vec::new();

    for mapping in &config.app_assets {
        let source = config.logo_dir.join(&mapping.source);
        for dir in &targets {
            let target = dir.join(&mapping.asset);
            reports.push(sync_one(&mapping.asset, &source, &target, force));
        }
    }

    let favicon = config.logo_dir.join("favicon.ico");
    if favicon.exists() && config.public_dir.is_dir() {
        let target = config.public_dir.join("favicon.ico");
        let existed = target.exists();
        let action = match fs::copy(&favicon, &target) {
            Ok(_) => {
                log_fs_modification("copy", &target, Some("favicon.ico"));
                if existed {
                    SyncAction::Updated
                } else {
                    SyncAction::Created
                }
            }
            Err(e) => SyncAction::Failed(e.to_string()),
        };
        reports.push(SyncReport {
            asset: "favicon.ico".to_string(),
            source: favicon,
            info: read_info(&target).ok(),
            target,
            action,
        });
    }

    Ok(reports)
}

fn sync_one(asset: &str, source: &Path, target: &Path, force: bool) -> SyncReport {
    let report = |action: SyncAction| SyncReport {
        asset: asset.to_string(),
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        info: read_info(target).ok(),
        action,
    };

    if !source.exists() {
        warn!("Source {} not found", source.display());
        return report(SyncAction::SourceMissing);
    }

    let decision = if force {
        Ok(if target.exists() {
            SyncAction::Updated
        } else {
            SyncAction::Created
        })
    } else {
        decide(source, target)
    };

    let action = match decision {
        Ok(SyncAction::Unchanged) => SyncAction::Unchanged,
        Ok(action) => match fs::copy(source, target) {
            Ok(_) => {
                log_fs_modification(
                    "copy",
                    target,
                    Some(&format!("{:?} from {}", action, source.display())),
                );
                action
            }
            Err(e) => SyncAction::Failed(e.to_string()),
        },
        Err(e) => SyncAction::Failed(e.to_string()),
    };

    info!("{}: {:?}", target.display(), action);
    report(action)
}

/// Copy when missing, or when size or mode differ
fn decide(source: &Path, target: &Path) -> Result<SyncAction> {
    if !target.exists() {
        return Ok(SyncAction::Created);
    }
    let source_info = read_info(source)?;
    // An unreadable target is replaced
    match read_info(target) {
        Ok(target_info) if target_info == source_info => Ok(SyncAction::Unchanged),
        _ => Ok(SyncAction::Updated),
    }
}

/// Check that each configured app asset exists and decodes
pub fn verify_assets(config: &Config) -> Vec<VerifyReport> {
    config
        .verify_files
        .iter()
        .map(|path| {
            let status = if !path.exists() {
                VerifyStatus::NotFound
            } else {
                match read_info(path) {
                    Ok(info) => VerifyStatus::Ok(info),
                    Err(e) => VerifyStatus::Error(e.to_string()),
                }
            };
            VerifyReport {
                path: path.clone(),
                status,
            }
        })
        .collect()
}
