//! Logo pack maintenance: keying icons in place and building the pro pack.
//!
//! The pack builder works in four steps:
//!
//! 1. every `logo-with-title-<size>.png` gets a `logo-with-title-on-dark-<size>.png` copy
//! 2. every on-dark wordmark is keyed into a transparent `logo-with-title-<size>.png`
//! 3. `mono_black.png` / `mono_white.png` are backed up to `*-on-dark.png` and keyed in place
//! 4. the pack is summarized by category
//!
//! Existing copies and backups are never overwritten.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::discovery::{discover_logos, file_name};
use crate::error::{Error, Result};
use crate::keyer::{key_batch, BatchOptions, KeyJob};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::{Category, FileReport, LogoFile};

const WORDMARK_PREFIX: &str = "logo-with-title-";
const ON_DARK_PREFIX: &str = "logo-with-title-on-dark-";
const MONO_FILES: [&str; 2] = ["mono_black.png", "mono_white.png"];

/// A copy made (or planned, in dry-run mode) while building the pack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyAction {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Files of one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub files: Vec<String>,
}

/// What `build_pack` did
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackReport {
    /// Step 1: on-dark copies of wordmarks
    pub on_dark_copies: Vec<CopyAction>,
    /// Step 2: transparent wordmarks keyed from on-dark copies
    pub wordmarks: Vec<FileReport>,
    /// Step 3: mono backups
    pub mono_backups: Vec<CopyAction>,
    /// Step 3: mono files keyed in place
    pub mono: Vec<FileReport>,
    /// Step 4
    pub summary: Vec<CategoryGroup>,
    /// Count of .png and .ico files after the build
    pub total_files: usize,
}

impl PackReport {
    pub fn has_errors(&self) -> bool {
        self.wordmarks.iter().chain(self.mono.iter()).any(FileReport::is_error)
    }
}

fn batch_options(config: &Config, skip_missing: bool) -> BatchOptions {
    BatchOptions {
        threads: config.threads,
        skip_missing,
        progress: false,
    }
}

/// Key every configured icon file in place; missing files are skipped
pub fn fix_icons(config: &Config) -> Result<Vec<FileReport>> {
    let palette = config.palette()?;
    let threshold = config.threshold()?;

    if !config.logo_dir.is_dir() {
        return Err(Error::FileNotFound(config.logo_dir.clone()));
    }

    let jobs: Vec<KeyJob> = config
        .icon_files
        .iter()
        .map(|name| KeyJob::in_place(config.logo_dir.join(name)))
        .collect();

    info!(
        "Removing backgrounds from {} icon files in {}",
        jobs.len(),
        config.logo_dir.display()
    );

    key_batch(&jobs, &palette, threshold, batch_options(config, true))
}

/// Build the pro asset pack in `config.logo_dir`
pub fn build_pack(config: &Config) -> Result<PackReport> {
    let palette = config.palette()?;
    let threshold = config.threshold()?;
    let dir = &config.logo_dir;

    let mut report = PackReport::default();

    // Step 1: on-dark copies of plain wordmarks
    let files = discover_logos(dir, config)?;
    for file in &files {
        let name = file.file_name();
        let Some(rest) = plain_wordmark_suffix(&name) else {
            continue;
        };
        let target = file.path.with_file_name(format!("{}{}", ON_DARK_PREFIX, rest));
        if target.exists() {
            continue;
        }
        copy_file(&file.path, &target, config.dry_run)?;
        report.on_dark_copies.push(CopyAction {
            from: file.path.clone(),
            to: target,
        });
    }

    // Step 2: transparent wordmarks from on-dark sources
    let on_dark: Vec<PathBuf> = if config.dry_run {
        // Planned copies do not exist yet
        files
            .iter()
            .map(|f| f.path.clone())
            .chain(report.on_dark_copies.iter().map(|c| c.to.clone()))
            .filter(|p| on_dark_suffix(&file_name(p)).is_some())
            .collect()
    } else {
        discover_logos(dir, config)?
            .into_iter()
            .map(|f| f.path)
            .filter(|p| on_dark_suffix(&file_name(p)).is_some())
            .collect()
    };

    let wordmark_jobs: Vec<KeyJob> = on_dark
        .iter()
        .filter_map(|path| {
            let name = file_name(path);
            on_dark_suffix(&name).map(|size| {
                KeyJob::new(path, path.with_file_name(format!("{}{}", WORDMARK_PREFIX, size)))
            })
        })
        .collect();

    if config.dry_run {
        for job in &wordmark_jobs {
            info!(
                "[dry run] would key {} -> {}",
                job.source.display(),
                job.destination.display()
            );
        }
    } else {
        report.wordmarks = key_batch(&wordmark_jobs, &palette, threshold, batch_options(config, false))?;
    }

    // Step 3: mono backups, then key in place
    let mut mono_jobs = Vec::new();
    for name in MONO_FILES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        let backup = dir.join(name.replace(".png", "-on-dark.png"));
        if !backup.exists() {
            copy_file(&path, &backup, config.dry_run)?;
            report.mono_backups.push(CopyAction {
                from: path.clone(),
                to: backup,
            });
        }
        mono_jobs.push(KeyJob::in_place(path));
    }

    if config.dry_run {
        for job in &mono_jobs {
            info!("[dry run] would key {} in place", job.source.display());
        }
    } else {
        report.mono = key_batch(&mono_jobs, &palette, threshold, batch_options(config, false))?;
    }

    // Step 4: summary
    let final_files = discover_logos(dir, config)?;
    report.summary = summarize(&final_files);
    report.total_files = final_files.len();

    Ok(report)
}

/// Group files by category in summary order; a file appears under every category it matches
pub fn summarize(files: &[LogoFile]) -> Vec<CategoryGroup> {
    Category::ALL
        .iter()
        .map(|category| CategoryGroup {
            category: *category,
            files: files
                .iter()
                .filter(|f| f.categories.contains(category))
                .map(LogoFile::file_name)
                .collect(),
        })
        .filter(|group| !group.files.is_empty())
        .collect()
}

/// `<rest>` of `logo-with-title-<rest>` for plain wordmarks not yet processed
fn plain_wordmark_suffix(name: &str) -> Option<&str> {
    if !name.ends_with(".png") || name.contains("-on-dark") || name.contains("-transparent") {
        return None;
    }
    name.strip_prefix(WORDMARK_PREFIX)
}

/// `<size>.png` of `logo-with-title-on-dark-<size>.png`
fn on_dark_suffix(name: &str) -> Option<&str> {
    if !name.ends_with(".png") {
        return None;
    }
    name.strip_prefix(ON_DARK_PREFIX)
}

fn copy_file(from: &Path, to: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        info!("[dry run] would copy {} -> {}", from.display(), to.display());
        return Ok(());
    }

    fs::copy(from, to).map_err(|e| {
        log_file_error(from, "copy", &e);
        e
    })?;
    log_fs_modification("copy", to, Some(&format!("from {}", from.display())));
    Ok(())
}
