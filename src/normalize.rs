use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::point::Point;

use crate::MaskPaintResult;
use crate::codec::{encode_png, load_image, persist};
use crate::config::{NormalizeOptions, ResizePolicy, TargetSize};
use crate::region::Region;

/// How source pixel coordinates map into a normalized canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: i64,
    pub offset_y: i64,
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0,
        offset_y: 0,
    };

    /// Placement the pad policy uses for a `source` sized image.
    pub fn pad(source: (u32, u32), target: TargetSize) -> Self {
        let (w, h) = source;
        let (cw, ch) = fit_within(source, target);
        let scale_x = if w == 0 { 1.0 } else { f64::from(cw) / f64::from(w) };
        let scale_y = if h == 0 { 1.0 } else { f64::from(ch) / f64::from(h) };
        Self {
            scale_x,
            scale_y,
            offset_x: (i64::from(target.width) - i64::from(cw)) / 2,
            offset_y: (i64::from(target.height) - i64::from(ch)) / 2,
        }
    }

    /// Placement the stretch policy uses for a `source` sized image.
    pub fn stretch(source: (u32, u32), target: TargetSize) -> Self {
        let (w, h) = source;
        Self {
            scale_x: if w == 0 { 1.0 } else { f64::from(target.width) / f64::from(w) },
            scale_y: if h == 0 { 1.0 } else { f64::from(target.height) / f64::from(h) },
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Map a single source coordinate.
    pub fn map_point(&self, point: Point<i32>) -> Point<i32> {
        let x = (f64::from(point.x) * self.scale_x).round() as i64 + self.offset_x;
        let y = (f64::from(point.y) * self.scale_y).round() as i64 + self.offset_y;
        Point::new(saturate_i32(x), saturate_i32(y))
    }

    /// Carry a region from source coordinates into the normalized canvas.
    pub fn map_region(&self, region: &Region) -> Region {
        region.map(|p| self.map_point(p))
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Size of `source` after shrinking it (never enlarging) to fit in `target`
/// with its aspect ratio kept. Each side is at least one pixel.
pub fn fit_within(source: (u32, u32), target: TargetSize) -> (u32, u32) {
    let (w, h) = source;
    if w <= target.width && h <= target.height {
        return (w, h);
    }
    let ratio = f64::min(
        f64::from(target.width) / f64::from(w),
        f64::from(target.height) / f64::from(h),
    );
    let scaled = |dim: u32, bound: u32| ((f64::from(dim) * ratio).round() as u32).clamp(1, bound);
    (scaled(w, target.width), scaled(h, target.height))
}

fn resample(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        image.resize_exact(width, height, filter)
    }
}

/// Shrink `image` to fit the target and center it on a padded canvas.
///
/// The canvas is transparent RGBA, or black grayscale in mask mode. Pixels are
/// replaced, not blended, so transparent source pixels stay transparent.
pub fn pad_image(image: &DynamicImage, options: &NormalizeOptions) -> (DynamicImage, Placement) {
    let target = options.target;
    let placement = Placement::pad(image.dimensions(), target);
    let (cw, ch) = fit_within(image.dimensions(), target);
    let content = resample(image, cw, ch, options.filter);
    let (ox, oy) = (placement.offset_x, placement.offset_y);

    let padded = if options.mask_mode {
        let mut canvas = GrayImage::from_pixel(target.width, target.height, Luma([0]));
        imageops::replace(&mut canvas, &content.to_luma8(), ox, oy);
        DynamicImage::ImageLuma8(canvas)
    } else {
        let mut canvas = RgbaImage::from_pixel(target.width, target.height, Rgba([0, 0, 0, 0]));
        imageops::replace(&mut canvas, &content.to_rgba8(), ox, oy);
        DynamicImage::ImageRgba8(canvas)
    };

    log::debug!(
        "padded {}x{} -> {}x{} content at ({ox}, {oy}) in {target}",
        image.width(),
        image.height(),
        cw,
        ch
    );
    (padded, placement)
}

/// Resample `image` to exactly the target, ignoring aspect ratio.
///
/// In mask mode the result is collapsed to single-channel grayscale; otherwise
/// the source color type is kept.
pub fn stretch_image(
    image: &DynamicImage,
    options: &NormalizeOptions,
) -> (DynamicImage, Placement) {
    let target = options.target;
    let placement = Placement::stretch(image.dimensions(), target);
    let stretched = resample(image, target.width, target.height, options.filter);
    let stretched = if options.mask_mode {
        DynamicImage::ImageLuma8(stretched.to_luma8())
    } else {
        stretched
    };
    (stretched, placement)
}

/// Apply `policy` to `image`.
pub fn normalize_image(
    image: &DynamicImage,
    policy: ResizePolicy,
    options: &NormalizeOptions,
) -> (DynamicImage, Placement) {
    match policy {
        ResizePolicy::Pad => pad_image(image, options),
        ResizePolicy::Stretch => stretch_image(image, options),
    }
}

/// Normalize the image at `input` and save the result as PNG at `output`.
pub fn normalize_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    policy: ResizePolicy,
    options: &NormalizeOptions,
) -> MaskPaintResult<PathBuf> {
    let source = load_image(input.as_ref())?;
    let (normalized, _) = normalize_image(&source, policy, options);
    let bytes = encode_png(&normalized)?;
    let written = persist(&bytes, output)?;
    match policy {
        ResizePolicy::Pad => log::info!("Saved resized image: {}", written.display()),
        ResizePolicy::Stretch => log::info!(
            "Saved {}: {}",
            if options.mask_mode { "mask" } else { "image" },
            written.display()
        ),
    }
    Ok(written)
}
