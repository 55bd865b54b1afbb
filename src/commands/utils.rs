use std::path::{Path, PathBuf};
#[cfg(feature = "inpaint")]
use std::time::Duration;

#[cfg(feature = "inpaint")]
use maskpaint::InpaintSettings;
use maskpaint::NormalizeOptions;

#[cfg(feature = "inpaint")]
use crate::cli::ApiArgs;
use crate::cli::GlobalOptions;

/// Normalization options from the global flags.
pub fn normalize_options(global: &GlobalOptions) -> NormalizeOptions {
    NormalizeOptions::default()
        .with_target(global.size)
        .with_filter(global.resample_filter.into())
}

/// Service settings from the API flags. The requested size follows `--size`.
#[cfg(feature = "inpaint")]
pub fn build_settings(global: &GlobalOptions, api: &ApiArgs) -> InpaintSettings {
    let mut settings = InpaintSettings::default()
        .with_model(api.model.clone())
        .with_endpoint(api.endpoint.clone())
        .with_size(global.size)
        .with_timeout(api.timeout_secs.map(Duration::from_secs));
    if let Some(key) = &api.api_key {
        settings = settings.with_api_key(key.clone());
    }
    settings
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}

/// Resolve an optional export flag: explicit path, derived default, or nothing.
#[cfg(feature = "inpaint")]
pub fn resolve_export_path(
    flag: &Option<Option<PathBuf>>,
    input: &Path,
    suffix: &str,
) -> Option<PathBuf> {
    match flag {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(derive_variant_path(input, suffix, "png")),
        None => None,
    }
}
