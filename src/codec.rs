//! Decoding sources and writing PNG artefacts.

use std::ffi::OsString;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageReader};

use crate::MaskPaintResult;

/// Decode an image file, guessing the format from its content rather than
/// its extension.
pub fn load_image(path: impl AsRef<Path>) -> MaskPaintResult<DynamicImage> {
    let image = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

/// Decode an image held in memory.
pub fn decode_image(bytes: &[u8]) -> MaskPaintResult<DynamicImage> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

/// Read the dimensions of an image file from its header, without decoding
/// the pixel data.
pub fn read_dimensions(path: impl AsRef<Path>) -> MaskPaintResult<(u32, u32)> {
    let dimensions = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Read the dimensions of an in-memory image from its header.
pub fn read_dimensions_in_memory(bytes: &[u8]) -> MaskPaintResult<(u32, u32)> {
    let dimensions = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Encode any image as PNG, keeping its color type.
pub fn encode_png(image: &DynamicImage) -> MaskPaintResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_with_encoder(PngEncoder::new(&mut bytes))?;
    Ok(bytes)
}

/// Write `bytes` to `path` through a sibling temporary file, so a failed
/// write never leaves a truncated artefact at `path`.
pub fn persist(bytes: &[u8], path: impl AsRef<Path>) -> MaskPaintResult<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_sibling(path);
    if let Err(err) = fs::write(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(path.to_path_buf())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}
