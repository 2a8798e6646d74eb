// File: qr.rs
// Location: /src/qr.rs

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::EncoderSettings;

const OUTPUT_PREFIX: &str = "qr_";

#[derive(Error, Debug)]
pub enum QrError {
    #[error("No URL provided")]
    EmptyUrl,

    #[error("Failed to encode QR code: {0}")]
    Encode(String),

    #[error("Failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid encoder settings: {0}")]
    Settings(String),
}

impl QrError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, QrError::EmptyUrl)
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, QrError::Save { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    pub url: String,
    pub output_path: Option<PathBuf>,
}

impl QrRequest {
    pub fn new(url: &str, output_path: Option<PathBuf>) -> Result<Self, QrError> {
        if url.is_empty() {
            return Err(QrError::EmptyUrl);
        }

        Ok(Self {
            url: url.to_string(),
            output_path,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    ec_level: EcLevel,
    module_size: u32,
    border: u32,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::L,
            module_size: 10,
            border: 4,
        }
    }
}

impl QrEncoder {
    pub fn from_settings(settings: &EncoderSettings) -> Result<Self, QrError> {
        settings
            .validate()
            .map_err(|e| QrError::Settings(e.to_string()))?;
        let ec_level = settings
            .ec_level()
            .map_err(|e| QrError::Settings(e.to_string()))?;

        Ok(Self {
            ec_level,
            module_size: settings.module_size,
            border: settings.border,
        })
    }

    /// Renders `url` as black modules on white, growing the symbol version as needed.
    pub fn render(&self, url: &str) -> Result<GrayImage, QrError> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), self.ec_level)
            .map_err(|e| QrError::Encode(e.to_string()))?;

        let symbol = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .dark_color(Luma([0]))
            .light_color(Luma([255]))
            .module_dimensions(self.module_size, self.module_size)
            .build();

        let pad = self.border * self.module_size;
        let mut canvas = GrayImage::from_pixel(
            symbol.width() + pad * 2,
            symbol.height() + pad * 2,
            Luma([255]),
        );
        image::imageops::replace(&mut canvas, &symbol, i64::from(pad), i64::from(pad));

        log::debug!(
            "Encoded {} bytes as version {:?} ({}x{} px)",
            url.len(),
            code.version(),
            canvas.width(),
            canvas.height()
        );

        Ok(canvas)
    }

    pub fn encode(&self, request: &QrRequest) -> Result<GrayImage, QrError> {
        let image = self.render(&request.url)?;

        if let Some(path) = request.output_path.as_deref() {
            save_image(&image, path)?;
        }

        Ok(image)
    }
}

/// Encodes `url` with the default encoder and optionally writes the result to `output_path`.
pub fn encode(url: &str, output_path: Option<&Path>) -> Result<GrayImage, QrError> {
    let request = QrRequest::new(url, output_path.map(Path::to_path_buf))?;
    QrEncoder::default().encode(&request)
}

/// Writes `image`, replacing any existing file. The format follows the
/// extension; paths without an extension are written as PNG.
pub fn save_image(image: &GrayImage, path: &Path) -> Result<(), QrError> {
    let save_error = |source| QrError::Save {
        path: path.to_path_buf(),
        source,
    };

    let format = match path.extension() {
        None => ImageFormat::Png,
        Some(_) => ImageFormat::from_path(path).map_err(save_error)?,
    };

    // GIF has no grayscale encoder.
    match format {
        ImageFormat::Gif => DynamicImage::ImageLuma8(image.clone())
            .to_rgba8()
            .save_with_format(path, format),
        _ => image.save_with_format(path, format),
    }
    .map_err(save_error)?;

    log::info!("Saved: {}", path.display());
    Ok(())
}

pub fn default_output_name(url: &str) -> String {
    let safe = url.replace("://", "_").replace('/', "_");
    format!("{}{}.png", OUTPUT_PREFIX, safe)
}

pub fn ensure_png_extension(path: &Path) -> PathBuf {
    let is_png = path
        .to_str()
        .map(|s| s.to_lowercase().ends_with(".png"))
        .unwrap_or(false);

    if is_png {
        return path.to_path_buf();
    }

    let mut raw = path.as_os_str().to_os_string();
    raw.push(".png");
    PathBuf::from(raw)
}
