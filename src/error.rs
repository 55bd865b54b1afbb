use thiserror::Error;

/// Result type alias for operations that may fail with [`MaskPaintError`].
pub type MaskPaintResult<T> = std::result::Result<T, MaskPaintError>;

/// Error types that can occur while building masks, normalizing images or
/// talking to the inpainting service.
///
/// Degenerate regions are not errors: they rasterize to an empty or partial
/// fill.
#[derive(Debug, Error)]
pub enum MaskPaintError {
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A region could not be parsed from text.
    #[error("Invalid region `{input}`: {reason}")]
    InvalidRegion { input: String, reason: String },
    /// A target size could not be parsed or has a zero dimension.
    #[error("Invalid target size `{0}`: expected WIDTHxHEIGHT with non-zero dimensions")]
    InvalidSize(String),
    /// API key missing or rejected by the service.
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    /// The service answered successfully but the body was not usable.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    /// Network or HTTP transport error.
    #[cfg(feature = "inpaint")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON decoding error.
    #[cfg(feature = "inpaint")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = MaskPaintError::Api {
            status: 400,
            message: "mask must be square".into(),
        };
        assert_eq!(err.to_string(), "API error: 400 - mask must be square");
    }

    #[test]
    fn invalid_region_display_names_input() {
        let err = MaskPaintError::InvalidRegion {
            input: "1,2,3".into(),
            reason: "expected 8 integers, got 3".into(),
        };
        let text = err.to_string();
        assert!(text.contains("1,2,3"));
        assert!(text.contains("expected 8 integers"));
    }

    #[test]
    fn io_error_is_transparent() {
        let err: MaskPaintError = std::io::Error::other("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
