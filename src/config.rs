use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use image::imageops::FilterType;

use crate::MaskPaintError;

/// Resolution imposed by the image edit service.
pub const DEFAULT_TARGET_SIZE: TargetSize = TargetSize {
    width: 1024,
    height: 1024,
};

/// Model used for edits unless overridden.
pub const DEFAULT_MODEL: &str = "dall-e-2";

/// Base URL of the image edit API.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Fixed output resolution of a normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height as a tuple, matching `image`'s `dimensions()`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        DEFAULT_TARGET_SIZE
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = MaskPaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MaskPaintError::InvalidSize(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// How an image is brought to the target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Shrink with aspect ratio preserved, then center on a padded canvas.
    Pad,
    /// Resample both axes independently to the exact target.
    Stretch,
}

/// Options for the size normalizer.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Output resolution.
    pub target: TargetSize,
    /// Resampling filter used whenever pixels have to be resized.
    pub filter: FilterType,
    /// Treat the input as a mask: black padding, grayscale stretch output.
    pub mask_mode: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_SIZE,
            filter: FilterType::Lanczos3,
            mask_mode: false,
        }
    }
}

impl NormalizeOptions {
    /// Set the output resolution.
    pub fn with_target(mut self, target: TargetSize) -> Self {
        self.target = target;
        self
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Toggle mask mode.
    pub fn with_mask_mode(mut self, mask_mode: bool) -> Self {
        self.mask_mode = mask_mode;
        self
    }
}

/// Connection settings for the image edit service.
///
/// Passed explicitly to [`InpaintClient::new`](crate::inpaint::InpaintClient::new);
/// nothing is read from process-wide state except the API key fallback.
#[derive(Clone)]
pub struct InpaintSettings {
    /// API key. Falls back to `OPENAI_API_KEY` when `None`.
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Output size requested from the service.
    pub size: TargetSize,
    /// API base URL, without a trailing `/images/edits`.
    pub endpoint: String,
    /// Overall request timeout. `None` uses the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for InpaintSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            size: DEFAULT_TARGET_SIZE,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

impl fmt::Debug for InpaintSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InpaintSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("size", &self.size)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl InpaintSettings {
    /// Set the API key explicitly.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the requested output size.
    pub fn with_size(mut self, size: TargetSize) -> Self {
        self.size = size;
        self
    }

    /// Set the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the API key from the settings or the environment.
    /// Empty strings count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.clone(), std::env::var(ENV_API_KEY).ok())
    }
}

fn resolve_key(explicit: Option<String>, env: Option<String>) -> Option<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| env.filter(|key| !key.trim().is_empty()))
}
