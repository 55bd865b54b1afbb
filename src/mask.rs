use std::io::Read;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use imageproc::contrast::{ThresholdType, threshold as ip_threshold};

use crate::MaskPaintResult;
use crate::codec::{encode_png, persist, read_dimensions, read_dimensions_in_memory};
use crate::raster::rasterize_region;
use crate::region::Region;

/// Coverage at or above this value marks an editable (transparent) pixel.
pub const EDITABLE_COVERAGE: u8 = 128;

/// Alpha of pixels the service may regenerate.
pub const ALPHA_EDITABLE: u8 = 0;

/// Alpha of pixels the service must keep.
pub const ALPHA_PROTECTED: u8 = 255;

/// Turn coverage into the mask's alpha plane: coverage >= 128 becomes
/// [`ALPHA_EDITABLE`], everything else [`ALPHA_PROTECTED`].
pub fn coverage_to_alpha(coverage: &GrayImage) -> GrayImage {
    // BinaryInverted maps `> thr` to 0 and `<= thr` to 255.
    ip_threshold(coverage, EDITABLE_COVERAGE - 1, ThresholdType::BinaryInverted)
}

/// Convert a coverage raster into an RGBA mask with black color channels.
pub fn coverage_to_mask(coverage: &GrayImage) -> RgbaImage {
    let alpha = coverage_to_alpha(coverage);
    let (w, h) = alpha.dimensions();
    let mut mask = RgbaImage::new(w, h);
    for (alpha_px, out_px) in alpha.pixels().zip(mask.pixels_mut()) {
        *out_px = Rgba([0, 0, 0, alpha_px[0]]);
    }
    mask
}

/// Rasterize `region` over a `width` x `height` canvas and convert it to a mask.
pub fn synthesize_mask(width: u32, height: u32, region: &Region) -> RgbaImage {
    let coverage = rasterize_region(width, height, region);
    coverage_to_mask(&coverage)
}

/// Build a mask the size of the image at `image_path` and save it as PNG to
/// `output_path`.
pub fn generate_mask(
    image_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    region: &Region,
) -> MaskPaintResult<PathBuf> {
    let (width, height) = read_dimensions(image_path.as_ref())?;
    let mask = synthesize_mask(width, height, region);
    let bytes = encode_png(&DynamicImage::ImageRgba8(mask))?;
    let written = persist(&bytes, output_path)?;
    log::info!("Transparent mask saved as: {}", written.display());
    Ok(written)
}

/// Build a mask for an image read from `reader` and return it as PNG bytes.
///
/// The reader is read to its end and is not rewound.
pub fn generate_mask_in_memory<R: Read>(
    reader: &mut R,
    region: &Region,
) -> MaskPaintResult<Vec<u8>> {
    let mut source_bytes = Vec::new();
    reader.read_to_end(&mut source_bytes)?;
    let (width, height) = read_dimensions_in_memory(&source_bytes)?;
    let mask = synthesize_mask(width, height, region);
    log::debug!("generated {width}x{height} mask for region {region}");
    encode_png(&DynamicImage::ImageRgba8(mask))
}
