//! # Background Keyer
//!
//! Turns background-colored pixels transparent.
//!
//! Every input is first normalized to 8-bit RGBA; sources without alpha come
//! out fully opaque. A pixel is keyed when its RGB distance to the nearest
//! palette color is at most the threshold. Keying only ever sets alpha to 0:
//! RGB channels are kept so no new colors appear, and pixels that are already
//! transparent are neither re-evaluated nor counted. Running the keyer twice
//! therefore gives the same image as running it once.

use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgba, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::log_key_result;
use crate::palette::{Palette, Rgb, Threshold};
use crate::types::{FileReport, FileStatus, KeyOutcome};

/// Key background pixels of an RGBA buffer in place.
/// Returns the number of pixels made transparent.
pub fn remove_background(image: &mut RgbaImage, palette: &Palette, threshold: Threshold) -> usize {
    let mut converted = 0;

    for pixel in image.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;

        if a == 0 {
            continue;
        }

        if palette.matches(&Rgb(r, g, b), threshold) {
            pixel.0[3] = 0;
            converted += 1;
        }
    }

    converted
}

/// Normalize any decoded image to RGBA and key it
pub fn key_image(image: DynamicImage, palette: &Palette, threshold: Threshold) -> (RgbaImage, usize) {
    let mut rgba = match image {
        DynamicImage::ImageRgba8(buffer) => buffer,
        other => other.to_rgba8(),
    };
    let converted = remove_background(&mut rgba, palette, threshold);
    (rgba, converted)
}

/// Read `source`, key it, and write an RGBA PNG to `destination`.
///
/// `destination` may equal `source`. The PNG is fully encoded in memory before
/// the file is opened, so a failure never leaves a truncated image behind.
pub fn key_file(
    source: &Path,
    destination: &Path,
    palette: &Palette,
    threshold: Threshold,
) -> Result<KeyOutcome> {
    let image = image::open(source).map_err(|e| Error::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let (width, height) = image.dimensions();
    debug!(
        "Loaded {} as {:?} ({}x{})",
        source.display(),
        image.color(),
        width,
        height
    );

    let (keyed, converted) = key_image(image, palette, threshold);

    let mut buf = Cursor::new(Vec::new());
    keyed
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| Error::Write {
            path: destination.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;

    std::fs::write(destination, buf.into_inner()).map_err(|e| Error::Write {
        path: destination.to_path_buf(),
        source: e,
    })?;

    Ok(KeyOutcome {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        width,
        height,
        converted,
    })
}

/// One unit of batch work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl KeyJob {
    /// Overwrite the source
    pub fn in_place<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: path.as_ref().to_path_buf(),
            destination: path.as_ref().to_path_buf(),
        }
    }

    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, destination: P2) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

/// Options for [`key_batch`]
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// 1 = sequential, 0 = rayon default, n = n workers
    pub threads: usize,

    /// Missing sources become `Skipped` instead of `Failed`
    pub skip_missing: bool,

    /// Draw an indicatif progress bar
    pub progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            skip_missing: false,
            progress: false,
        }
    }
}

/// Key each job independently; one failure never aborts the rest.
/// Reports come back in job order.
pub fn key_batch(
    jobs: &[KeyJob],
    palette: &Palette,
    threshold: Threshold,
    options: BatchOptions,
) -> Result<Vec<FileReport>> {
    let progress_bar = if options.progress {
        let bar = ProgressBar::new(jobs.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .map_err(|e| Error::Configuration(format!("Invalid progress template: {}", e)))?
                .progress_chars("##-"),
        );
        bar.set_message("Keying backgrounds...");
        bar
    } else {
        ProgressBar::hidden()
    };

    let run = |job: &KeyJob| {
        let report = key_job(job, palette, threshold, options.skip_missing);
        log_key_result(&report);
        progress_bar.inc(1);
        report
    };

    let reports: Vec<FileReport> = if options.threads == 1 {
        jobs.iter().map(run).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))?;
        pool.install(|| jobs.par_iter().map(run).collect())
    };

    progress_bar.finish_and_clear();
    Ok(reports)
}

fn key_job(job: &KeyJob, palette: &Palette, threshold: Threshold, skip_missing: bool) -> FileReport {
    if skip_missing && !job.source.exists() {
        return FileReport {
            path: job.source.clone(),
            status: FileStatus::Skipped,
        };
    }

    let status = match key_file(&job.source, &job.destination, palette, threshold) {
        Ok(outcome) => FileStatus::Keyed(outcome),
        Err(e) => FileStatus::Failed(e.to_string()),
    };

    FileReport {
        path: job.source.clone(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, RgbImage};
    use tempfile::tempdir;

    fn single_pixel(px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba(px))
    }

    fn black() -> Palette {
        Palette::from_colors([Rgb(0, 0, 0)]).unwrap()
    }

    fn t(value: f64) -> Threshold {
        Threshold::new(value).unwrap()
    }

    #[test]
    fn test_near_black_is_keyed() {
        let mut img = single_pixel([5, 5, 5, 255]);
        let count = remove_background(&mut img, &black(), t(10.0));
        assert_eq!(count, 1);
        assert_eq!(img.get_pixel(0, 0).0, [5, 5, 5, 0]);
    }

    #[test]
    fn test_far_color_is_untouched() {
        let navy = Palette::from_colors([Rgb(10, 15, 31)]).unwrap();
        let mut img = single_pixel([200, 200, 200, 255]);
        let count = remove_background(&mut img, &navy, t(25.0));
        assert_eq!(count, 0);
        assert_eq!(img.get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_transparent_pixel_not_counted() {
        let mut img = single_pixel([0, 0, 0, 0]);
        let count = remove_background(&mut img, &black(), t(100.0));
        assert_eq!(count, 0);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_zero_threshold_is_exact() {
        let mut exact = single_pixel([0, 0, 0, 255]);
        assert_eq!(remove_background(&mut exact, &black(), t(0.0)), 1);

        let mut off_by_one = single_pixel([1, 0, 0, 255]);
        assert_eq!(remove_background(&mut off_by_one, &black(), t(0.0)), 0);
        assert_eq!(off_by_one.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // distance exactly 5
        let mut img = single_pixel([3, 4, 0, 255]);
        assert_eq!(remove_background(&mut img, &black(), t(5.0)), 1);
    }

    #[test]
    fn test_boundary_is_inclusive_for_fractional_threshold() {
        let mut img = single_pixel([1, 1, 1, 255]);
        let limit = t(Rgb(1, 1, 1).distance(&Rgb(0, 0, 0)));
        assert_eq!(remove_background(&mut img, &black(), limit), 1);
        assert_eq!(img.get_pixel(0, 0).0, [1, 1, 1, 0]);
    }

    #[test]
    fn test_partial_alpha_is_evaluated() {
        let mut img = single_pixel([0, 0, 0, 128]);
        assert_eq!(remove_background(&mut img, &black(), t(0.0)), 1);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_rgb_source_normalized_opaque() {
        let mut rgb = RgbImage::from_pixel(2, 1, image::Rgb([250, 250, 250]));
        rgb.put_pixel(1, 0, image::Rgb([10, 15, 31]));

        let (out, count) = key_image(
            DynamicImage::ImageRgb8(rgb),
            &Palette::brand_default(),
            Threshold::default(),
        );
        assert_eq!(count, 1);
        assert_eq!(out.get_pixel(0, 0).0, [250, 250, 250, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [10, 15, 31, 0]);
    }

    #[test]
    fn test_luma_alpha_source_normalized() {
        let mut la = GrayAlphaImage::from_pixel(2, 1, LumaA([12, 255]));
        la.put_pixel(1, 0, LumaA([240, 200]));

        let (out, count) = key_image(DynamicImage::ImageLumaA8(la), &black(), t(25.0));
        assert_eq!(count, 1);
        assert_eq!(out.get_pixel(0, 0).0, [12, 12, 12, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [240, 240, 240, 200]);
    }

    #[test]
    fn test_key_file_missing_source_is_read_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        let result = key_file(&missing, &missing, &black(), t(10.0));
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_key_file_missing_parent_is_write_error() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.png");
        single_pixel([0, 0, 0, 255]).save(&src).unwrap();

        let dst = dir.path().join("no_such_dir").join("out.png");
        let result = key_file(&src, &dst, &black(), t(10.0));
        assert!(matches!(result, Err(Error::Write { .. })));

        // source untouched
        let reread = image::open(&src).unwrap().to_rgba8();
        assert_eq!(reread.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_key_batch_skips_missing_when_asked() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.png");
        single_pixel([0, 0, 0, 255]).save(&present).unwrap();
        let missing = dir.path().join("missing.png");

        let jobs = vec![KeyJob::in_place(&missing), KeyJob::in_place(&present)];
        let options = BatchOptions {
            skip_missing: true,
            ..Default::default()
        };
        let reports = key_batch(&jobs, &black(), t(0.0), options).unwrap();

        assert!(matches!(reports[0].status, FileStatus::Skipped));
        match &reports[1].status {
            FileStatus::Keyed(outcome) => assert_eq!(outcome.converted, 1),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(!reports.iter().any(FileReport::is_error));
    }
}
