//! Client for the remote image edit (inpainting) service.
//!
//! This module is only available when the `inpaint` feature is enabled.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::codec::{decode_image, persist};
use crate::config::{ENV_API_KEY, InpaintSettings};
use crate::{MaskHandle, MaskPaintError, MaskPaintResult, PreparedImage};

/// Blocking client for the `/images/edits` endpoint.
///
/// Every call returns a typed result; nothing is retried.
pub struct InpaintClient {
    http: Client,
    api_key: String,
    settings: InpaintSettings,
}

impl InpaintClient {
    /// Build a client, resolving the API key from the settings or `OPENAI_API_KEY`.
    pub fn new(settings: InpaintSettings) -> MaskPaintResult<Self> {
        let api_key = settings.resolve_api_key().ok_or_else(|| {
            MaskPaintError::Auth(format!("{ENV_API_KEY} not set and no API key provided"))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_key,
            settings,
        })
    }

    pub fn settings(&self) -> &InpaintSettings {
        &self.settings
    }

    fn edits_url(&self) -> String {
        format!("{}/images/edits", self.settings.endpoint.trim_end_matches('/'))
    }

    /// Submit PNG-encoded image and mask bytes with a prompt and return the
    /// URL of the generated image.
    pub fn edit_bytes(
        &self,
        image: Vec<u8>,
        mask: Vec<u8>,
        prompt: &str,
    ) -> MaskPaintResult<String> {
        let form = Form::new()
            .text("model", self.settings.model.clone())
            .text("prompt", prompt.to_string())
            .text("n", "1")
            .text("size", self.settings.size.to_string())
            .part("image", png_part(image, "image.png")?)
            .part("mask", png_part(mask, "mask.png")?);

        log::debug!(
            "submitting edit to {} (model {}, size {})",
            self.edits_url(),
            self.settings.model,
            self.settings.size
        );

        let response = self
            .http
            .post(self.edits_url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }
        parse_edit_response(&text)
    }

    /// Submit an image and mask stored on disk.
    pub fn edit_files(
        &self,
        image_path: impl AsRef<Path>,
        mask_path: impl AsRef<Path>,
        prompt: &str,
    ) -> MaskPaintResult<String> {
        let image = fs::read(image_path.as_ref())?;
        let mask = fs::read(mask_path.as_ref())?;
        self.edit_bytes(image, mask, prompt)
    }

    /// Submit a prepared image together with its mask.
    pub fn edit_prepared(
        &self,
        image: &PreparedImage,
        mask: &MaskHandle,
        prompt: &str,
    ) -> MaskPaintResult<String> {
        self.edit_bytes(image.to_png_bytes()?, mask.to_png_bytes()?, prompt)
    }

    /// Fetch the generated image at `url` and save it to `output`.
    ///
    /// The format follows the output extension, falling back to PNG.
    pub fn download(&self, url: &str, output: impl AsRef<Path>) -> MaskPaintResult<PathBuf> {
        let output = output.as_ref();
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(MaskPaintError::Api {
                status: status.as_u16(),
                message: "Failed to download generated image".into(),
            });
        }
        let body = response.bytes()?;
        let image = decode_image(&body)?;

        let format = ImageFormat::from_path(output).unwrap_or(ImageFormat::Png);
        let mut encoded = Cursor::new(Vec::new());
        image.write_to(&mut encoded, format)?;
        let written = persist(encoded.get_ref(), output)?;
        log::info!("Inpainted image saved to {}", written.display());
        Ok(written)
    }
}

fn png_part(bytes: Vec<u8>, file_name: &'static str) -> MaskPaintResult<Part> {
    Ok(Part::bytes(bytes).file_name(file_name).mime_str("image/png")?)
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    data: Vec<EditData>,
}

#[derive(Debug, Deserialize)]
struct EditData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_edit_response(text: &str) -> MaskPaintResult<String> {
    let response: EditResponse = serde_json::from_str(text)?;
    response
        .data
        .into_iter()
        .next()
        .and_then(|data| data.url)
        .ok_or_else(|| {
            MaskPaintError::UnexpectedResponse("edit response contained no image URL".into())
        })
}

fn parse_error(status: u16, text: &str) -> MaskPaintError {
    let message = serde_json::from_str::<ErrorEnvelope>(text)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| text.trim().to_string());
    match status {
        401 | 403 => MaskPaintError::Auth(message),
        _ => MaskPaintError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Serve one HTTP response on a loopback port and hand back the raw request.
    fn serve_once(status: &str, content_type: &str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind loopback");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();
        let content_type = content_type.to_string();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("no connection");
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            let mut chunked = false;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("failed to read header");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    } else if name.eq_ignore_ascii_case("transfer-encoding") {
                        chunked = value.to_ascii_lowercase().contains("chunked");
                    }
                }
                head.push_str(&line);
            }

            let mut request_body = Vec::new();
            if chunked {
                loop {
                    let mut size_line = String::new();
                    reader.read_line(&mut size_line).expect("failed to read chunk size");
                    let size_hex = size_line.trim().split(';').next().unwrap_or("0");
                    let size = usize::from_str_radix(size_hex, 16).unwrap_or(0);
                    let mut chunk = vec![0u8; size + 2];
                    if size == 0 {
                        let mut trailer = String::new();
                        reader.read_line(&mut trailer).expect("failed to read trailer");
                        break;
                    }
                    reader.read_exact(&mut chunk).expect("failed to read chunk");
                    request_body.extend_from_slice(&chunk[..size]);
                }
            } else {
                request_body.resize(content_length, 0);
                reader.read_exact(&mut request_body).expect("failed to read body");
            }

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();

            head + &String::from_utf8_lossy(&request_body)
        });

        (base, handle)
    }

    /// Loopback tests bypass any proxy configured in the environment.
    fn client_for(endpoint: &str) -> InpaintClient {
        let http = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build http client");
        InpaintClient {
            http,
            api_key: "sk-test".into(),
            settings: InpaintSettings::default().with_endpoint(endpoint),
        }
    }

    mod unit {
        use super::*;

        #[test]
        fn new_accepts_explicit_key() {
            let client = InpaintClient::new(InpaintSettings::default().with_api_key("sk-explicit"))
                .expect("explicit key should be enough");
            assert_eq!(client.api_key, "sk-explicit");
            assert_eq!(client.settings().model, "dall-e-2");
        }

        #[test]
        fn edits_url_joins_endpoint() {
            let client = client_for("https://api.example.com/v1/");
            assert_eq!(client.edits_url(), "https://api.example.com/v1/images/edits");
        }

        #[test]
        fn parses_url_from_response() {
            let body = r#"{"created": 1, "data": [{"url": "https://cdn/img.png"}]}"#;
            let url = parse_edit_response(body).unwrap();
            assert_eq!(url, "https://cdn/img.png");
        }

        #[test]
        fn empty_data_is_unexpected_response() {
            let err = parse_edit_response(r#"{"data": []}"#).unwrap_err();
            assert!(matches!(err, MaskPaintError::UnexpectedResponse(_)));
        }

        #[test]
        fn malformed_json_is_json_error() {
            let err = parse_edit_response("<html>").unwrap_err();
            assert!(matches!(err, MaskPaintError::Json(_)));
        }

        #[test]
        fn error_envelope_message_is_extracted() {
            let body = r#"{"error": {"message": "Invalid mask", "type": "invalid_request_error"}}"#;
            let err = parse_error(400, body);
            match err {
                MaskPaintError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "Invalid mask");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn unauthorized_maps_to_auth() {
            let err = parse_error(401, "bad key");
            assert!(matches!(err, MaskPaintError::Auth(msg) if msg == "bad key"));
        }
    }

    mod loopback {
        use super::*;
        use crate::codec::encode_png;
        use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

        #[test]
        fn edit_bytes_posts_multipart_and_returns_url() {
            let (base, server) = serve_once(
                "200 OK",
                "application/json",
                br#"{"data": [{"url": "https://cdn.example/result.png"}]}"#.to_vec(),
            );
            let client = client_for(&format!("{base}/v1"));
            let blank = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
            let image = encode_png(&blank).unwrap();
            let mask = encode_png(&blank).unwrap();

            let url = client
                .edit_bytes(image, mask, "give the frog a cowboy hat")
                .unwrap();
            let request = server.join().unwrap();

            assert_eq!(url, "https://cdn.example/result.png");
            assert!(request.starts_with("POST /v1/images/edits"));
            assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
            assert!(request.contains("give the frog a cowboy hat"));
            assert!(request.contains("name=\"mask\""));
            assert!(request.contains("name=\"image\""));
            assert!(request.contains("dall-e-2"));
            assert!(request.contains("1024x1024"));
        }

        #[test]
        fn edit_bytes_surfaces_api_error() {
            let (base, server) = serve_once(
                "400 Bad Request",
                "application/json",
                br#"{"error": {"message": "Uploaded image must be a PNG"}}"#.to_vec(),
            );
            let client = client_for(&base);

            let err = client.edit_bytes(vec![1], vec![2], "prompt").unwrap_err();
            server.join().unwrap();

            match err {
                MaskPaintError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "Uploaded image must be a PNG");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn download_saves_decoded_image() {
            let png = encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
                6,
                5,
                Rgb([1, 2, 3]),
            )))
            .unwrap();
            let (base, server) = serve_once("200 OK", "image/png", png);
            let client = client_for(&base);
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("inpainted.png");

            let written = client
                .download(&format!("{base}/result.png"), &output)
                .unwrap();
            server.join().unwrap();

            assert_eq!(written, output);
            let saved = image::open(&output).unwrap().to_rgb8();
            assert_eq!(saved.dimensions(), (6, 5));
            assert_eq!(saved.get_pixel(0, 0).0, [1, 2, 3]);
        }

        #[test]
        fn download_failure_leaves_no_file() {
            let (base, server) = serve_once("404 Not Found", "text/plain", b"gone".to_vec());
            let client = client_for(&base);
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("inpainted.png");

            let err = client.download(&format!("{base}/expired"), &output).unwrap_err();
            server.join().unwrap();

            assert!(matches!(err, MaskPaintError::Api { status: 404, .. }));
            assert!(!output.exists());
        }
    }
}
