pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "inpaint")]
pub mod inpaint;
pub mod mask;
pub mod normalize;
pub mod raster;
pub mod region;

pub use config::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TARGET_SIZE, ENV_API_KEY, InpaintSettings,
    NormalizeOptions, ResizePolicy, TargetSize,
};
pub use error::{MaskPaintError, MaskPaintResult};
#[cfg(feature = "inpaint")]
pub use inpaint::InpaintClient;
pub use mask::{generate_mask, generate_mask_in_memory, synthesize_mask};
pub use normalize::{Placement, normalize_file, normalize_image};
pub use region::Region;

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::codec::{decode_image, encode_png, load_image, persist};

/// Entry point for preparing an image and its mask for an edit request.
#[derive(Debug, Clone)]
pub struct MaskPaint {
    /// Target size, filter and mask mode for normalization.
    options: NormalizeOptions,
    /// `None` leaves sources at their own resolution.
    policy: Option<ResizePolicy>,
}

impl Default for MaskPaint {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskPaint {
    /// Pad to 1024x1024 with Lanczos resampling.
    pub fn new() -> Self {
        Self {
            options: NormalizeOptions::default(),
            policy: Some(ResizePolicy::Pad),
        }
    }

    /// Set the resolution sources are normalized to.
    pub fn with_target_size(mut self, target: TargetSize) -> Self {
        self.options.target = target;
        self
    }

    /// Set the filter used when a source has to be resampled.
    pub fn with_resize_filter(mut self, filter: FilterType) -> Self {
        self.options.filter = filter;
        self
    }

    /// Choose the normalization policy, or `None` to keep sources as they are.
    pub fn with_policy(mut self, policy: Option<ResizePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    pub fn policy(&self) -> Option<ResizePolicy> {
        self.policy
    }

    /// Load the source image at `path` and normalize it.
    pub fn for_image(&self, path: impl AsRef<Path>) -> MaskPaintResult<PreparedImage> {
        let source = load_image(path)?;
        Ok(self.prepare(source))
    }

    /// Decode an in-memory source image and normalize it.
    pub fn for_bytes(&self, bytes: &[u8]) -> MaskPaintResult<PreparedImage> {
        let source = decode_image(bytes)?;
        Ok(self.prepare(source))
    }

    /// Normalize an already decoded source. Sources already at the target
    /// resolution go through the policy too but are not resampled.
    pub fn prepare(&self, source: DynamicImage) -> PreparedImage {
        match self.policy {
            Some(policy) => {
                let (image, placement) = normalize_image(&source, policy, &self.options);
                PreparedImage { image, placement }
            }
            None => PreparedImage {
                image: source,
                placement: Placement::IDENTITY,
            },
        }
    }
}

/// A source image ready to be sent, with the placement that produced it.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    image: DynamicImage,
    placement: Placement,
}

impl PreparedImage {
    /// Get a reference to the prepared image.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the handle and return the prepared image.
    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// How source coordinates map onto this image.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Build the mask for `region`, given in source image coordinates.
    pub fn mask(&self, region: &Region) -> MaskHandle {
        let mapped = self.placement.map_region(region);
        log::debug!("region {region} mapped to {mapped}");
        MaskHandle {
            mask: synthesize_mask(self.image.width(), self.image.height(), &mapped),
        }
    }

    /// Encode the prepared image as PNG.
    pub fn to_png_bytes(&self) -> MaskPaintResult<Vec<u8>> {
        encode_png(&self.image)
    }

    /// Save the prepared image as PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> MaskPaintResult<PathBuf> {
        persist(&self.to_png_bytes()?, path)
    }
}

/// An RGBA mask: transparent where the service may edit, opaque elsewhere.
#[derive(Debug, Clone)]
pub struct MaskHandle {
    mask: RgbaImage,
}

impl MaskHandle {
    /// Get a reference to the mask.
    pub fn image(&self) -> &RgbaImage {
        &self.mask
    }

    /// Consume the handle and return the mask.
    pub fn into_image(self) -> RgbaImage {
        self.mask
    }

    /// Encode the mask as PNG.
    pub fn to_png_bytes(&self) -> MaskPaintResult<Vec<u8>> {
        encode_png(&DynamicImage::ImageRgba8(self.mask.clone()))
    }

    /// Save the mask as PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> MaskPaintResult<PathBuf> {
        persist(&self.to_png_bytes()?, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn rgb(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 120, 150])))
    }

    #[test]
    fn target_sized_source_is_padded_to_rgba_in_place() {
        let source = rgb(16, 16);
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(16, 16))
            .prepare(source.clone());
        assert_eq!(prepared.placement(), Placement::IDENTITY);
        assert_eq!(prepared.image().color(), image::ColorType::Rgba8);
        assert_eq!(prepared.image().to_rgb8(), source.to_rgb8());
    }

    #[test]
    fn target_sized_source_keeps_color_type_under_stretch() {
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(16, 16))
            .with_policy(Some(ResizePolicy::Stretch))
            .prepare(rgb(16, 16));
        assert_eq!(prepared.placement(), Placement::IDENTITY);
        assert_eq!(prepared.image().color(), image::ColorType::Rgb8);
    }

    #[test]
    fn saturated_placement_still_builds_mask() {
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(64, 64))
            .with_policy(Some(ResizePolicy::Stretch))
            .prepare(rgb(1, 1));
        let mask = prepared.mask(&Region::rect(0, 0, 100_000_000, 0));

        let image = mask.image();
        assert!((0..64).all(|x| image.get_pixel(x, 0).0[3] == 0));
        assert!((0..64).all(|x| image.get_pixel(x, 1).0[3] == 255));
    }

    #[test]
    fn no_policy_keeps_original_resolution() {
        let prepared = MaskPaint::new().with_policy(None).prepare(rgb(30, 10));
        assert_eq!((prepared.image().width(), prepared.image().height()), (30, 10));
    }

    #[test]
    fn stretch_policy_maps_region_with_scale() {
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(20, 20))
            .with_policy(Some(ResizePolicy::Stretch))
            .prepare(rgb(10, 40));
        let mask = prepared.mask(&Region::rect(2, 8, 6, 16));

        // x doubled, y halved.
        assert_eq!(mask.image().get_pixel(8, 6).0[3], 0);
        assert_eq!(mask.image().get_pixel(1, 1).0[3], 255);
        assert_eq!(mask.image().get_pixel(15, 15).0[3], 255);
    }

    #[test]
    fn mask_and_image_share_dimensions() {
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(64, 64))
            .prepare(rgb(120, 80));
        let mask = prepared.mask(&Region::rect(10, 10, 50, 50));
        assert_eq!(
            mask.image().dimensions(),
            (prepared.image().width(), prepared.image().height())
        );
    }

    #[test]
    fn for_bytes_rejects_garbage() {
        assert!(MaskPaint::new().for_bytes(b"nope").is_err());
    }

    #[test]
    fn handles_save_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = MaskPaint::new()
            .with_target_size(TargetSize::new(8, 8))
            .prepare(rgb(4, 4));
        let mask = prepared.mask(&Region::full(4, 4));

        let image_path = prepared.save(dir.path().join("image.png")).unwrap();
        let mask_path = mask.save(dir.path().join("mask.png")).unwrap();

        assert_eq!(image::open(image_path).unwrap().width(), 8);
        let saved_mask = image::open(mask_path).unwrap().to_rgba8();
        assert_eq!(saved_mask.get_pixel(4, 4).0, [0, 0, 0, 0]);
        assert_eq!(saved_mask.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
