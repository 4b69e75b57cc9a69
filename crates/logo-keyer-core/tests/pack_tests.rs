mod common;

use common::{open_rgba, write_logo, TEAL};
use logo_keyer_core::analysis::analyze_dir;
use logo_keyer_core::pack::{build_pack, fix_icons};
use logo_keyer_core::{Category, Config, Error, FileStatus};
use std::path::Path;
use tempfile::tempdir;

fn config_for(dir: &Path) -> Config {
    Config {
        logo_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_fix_icons_keys_present_and_skips_missing() {
    let dir = tempdir().unwrap();
    let favicon = write_logo(dir.path(), "favicon_16.png", 16);
    write_logo(dir.path(), "pwa_256.png", 8);

    let reports = fix_icons(&config_for(dir.path())).unwrap();
    assert_eq!(reports.len(), Config::default().icon_files.len());

    let keyed: Vec<_> = reports
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Keyed(_)))
        .collect();
    assert_eq!(keyed.len(), 2);
    assert!(!reports.iter().any(|r| r.is_error()));

    let img = open_rgba(&favicon);
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(img.get_pixel(8, 8).0, [TEAL[0], TEAL[1], TEAL[2], 255]);
}

#[test]
fn test_fix_icons_missing_pack_dir() {
    let config = config_for(Path::new("/path/that/does/not/exist"));
    assert!(matches!(fix_icons(&config), Err(Error::FileNotFound(_))));
}

#[test]
fn test_analysis_flags_opaque_icons() {
    let dir = tempdir().unwrap();
    write_logo(dir.path(), "android_48.png", 8);
    write_logo(dir.path(), "logo-with-title-512.png", 8);

    let before = analyze_dir(dir.path(), &config_for(dir.path())).unwrap();
    let flagged: Vec<_> = before.iter().filter(|a| a.needs_fix()).map(|a| a.name.as_str()).collect();
    assert_eq!(flagged, vec!["android_48.png"]);

    fix_icons(&config_for(dir.path())).unwrap();

    let after = analyze_dir(dir.path(), &config_for(dir.path())).unwrap();
    assert!(!after.iter().any(|a| a.needs_fix()));
}

#[test]
fn test_build_pack() {
    let dir = tempdir().unwrap();
    let pack = dir.path();
    write_logo(pack, "logo-with-title-512.png", 16);
    write_logo(pack, "mono_black.png", 8);
    write_logo(pack, "favicon_32.png", 8);

    let report = build_pack(&config_for(pack)).unwrap();

    // Step 1
    assert_eq!(report.on_dark_copies.len(), 1);
    let on_dark = pack.join("logo-with-title-on-dark-512.png");
    assert!(on_dark.exists());
    assert_eq!(open_rgba(&on_dark).get_pixel(0, 0).0[3], 255);

    // Step 2
    assert_eq!(report.wordmarks.len(), 1);
    match &report.wordmarks[0].status {
        FileStatus::Keyed(outcome) => {
            assert_eq!(outcome.destination, pack.join("logo-with-title-512.png"));
            assert_eq!(outcome.converted, 16 * 16 - 8 * 8);
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(open_rgba(&pack.join("logo-with-title-512.png")).get_pixel(0, 0).0[3], 0);

    // Step 3
    assert_eq!(report.mono_backups.len(), 1);
    assert!(pack.join("mono_black-on-dark.png").exists());
    assert_eq!(open_rgba(&pack.join("mono_black.png")).get_pixel(0, 0).0[3], 0);
    assert_eq!(open_rgba(&pack.join("mono_black-on-dark.png")).get_pixel(0, 0).0[3], 255);

    // Step 4
    assert_eq!(report.total_files, 5);
    let categories: Vec<Category> = report.summary.iter().map(|g| g.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::IconOnly,
            Category::Wordmark,
            Category::WordmarkOnDark,
            Category::Monochrome,
            Category::Uncategorized,
        ]
    );
    assert!(!report.has_errors());

    // A second build makes no new copies
    let again = build_pack(&config_for(pack)).unwrap();
    assert!(again.on_dark_copies.is_empty());
    assert!(again.mono_backups.is_empty());
}

#[test]
fn test_build_pack_dry_run_touches_nothing() {
    let dir = tempdir().unwrap();
    let pack = dir.path();
    let wordmark = write_logo(pack, "logo-with-title-512.png", 8);
    write_logo(pack, "mono_white.png", 8);

    let config = Config {
        dry_run: true,
        ..config_for(pack)
    };
    let report = build_pack(&config).unwrap();

    assert_eq!(report.on_dark_copies.len(), 1);
    assert_eq!(report.mono_backups.len(), 1);
    assert!(report.wordmarks.is_empty());
    assert!(report.mono.is_empty());
    assert!(!pack.join("logo-with-title-on-dark-512.png").exists());
    assert!(!pack.join("mono_white-on-dark.png").exists());
    assert_eq!(open_rgba(&wordmark).get_pixel(0, 0).0[3], 255);
    assert_eq!(report.total_files, 2);
}
