#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Brand navy background
pub const NAVY: [u8; 3] = [10, 15, 31];

/// Teal accent that must survive keying
pub const TEAL: [u8; 3] = [0, 184, 217];

/// A logo-like RGB image: navy background with a teal square in the middle
pub fn logo_on_navy(size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, Rgb(NAVY));
    let quarter = size / 4;
    for y in quarter..size - quarter {
        for x in quarter..size - quarter {
            img.put_pixel(x, y, Rgb(TEAL));
        }
    }
    img
}

/// Save a navy/teal logo as an RGB PNG and return its path
pub fn write_logo(dir: &Path, name: &str, size: u32) -> PathBuf {
    let path = dir.join(name);
    logo_on_navy(size).save(&path).unwrap();
    path
}

/// A gradient covering many distances from black, with a few transparent pixels
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = ((x + y * width) % 64) as u8;
        let alpha = if (x + y) % 7 == 0 { 0 } else { 255 };
        Rgba([v, v / 2, v.saturating_mul(3), alpha])
    })
}

/// Number of fully transparent pixels
pub fn transparent_count(img: &RgbaImage) -> usize {
    img.pixels().filter(|p| p.0[3] == 0).count()
}

pub fn open_rgba(path: &Path) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}
