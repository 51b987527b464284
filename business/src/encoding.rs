//! QR rasterisation behind an async gateway.
//!
//! The symbol itself comes from the `qrcode` crate; this module only turns its module matrix
//! into a square RGBA raster with a quiet zone and the requested colors.

use std::{
    fmt,
    io::Cursor,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use qrcode::{Color, EcLevel, QrCode, types::QrError};
use serde::{Deserialize, Serialize};

use crate::color::QrColor;

pub const MIN_WIDTH: u32 = 200;
pub const MAX_WIDTH: u32 = 800;

/// Light modules drawn around the symbol on every side.
const QUIET_ZONE: u32 = 4;

/// Global counter for artifact revisions, so textures can be re-uploaded only when needed.
static REVISION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// QR redundancy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub const ALL: [Self; 4] = [Self::L, Self::M, Self::Q, Self::H];

    /// Label used by the level selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::L => "Low (7%)",
            Self::M => "Medium (15%)",
            Self::Q => "Quartile (25%)",
            Self::H => "High (30%)",
        }
    }

    fn ec_level(self) -> EcLevel {
        match self {
            Self::L => EcLevel::L,
            Self::M => EcLevel::M,
            Self::Q => EcLevel::Q,
            Self::H => EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Edge length of the square output in pixels.
    pub width: u32,
    pub dark: QrColor,
    pub light: QrColor,
    pub error_correction: ErrorCorrection,
}

impl EncodeOptions {
    /// Black on white at the given width and level.
    pub fn plain(width: u32, error_correction: ErrorCorrection) -> Self {
        Self {
            width,
            dark: QrColor::BLACK,
            light: QrColor::WHITE,
            error_correction,
        }
    }

    pub fn clamp_width(width: u32) -> u32 {
        width.clamp(MIN_WIDTH, MAX_WIDTH)
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::plain(400, ErrorCorrection::M)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Nothing to encode")]
    EmptyPayload,
    #[error("Width {0} is outside {MIN_WIDTH}..={MAX_WIDTH}")]
    InvalidWidth(u32),
    #[error("{bytes} bytes is too much data for error correction level {level}")]
    DataTooLong { bytes: usize, level: ErrorCorrection },
    #[error("Encoder rejected the payload: {0}")]
    Rejected(String),
    #[error("Failed to render image: {0}")]
    Render(String),
    #[error("Encoding was interrupted: {0}")]
    Interrupted(String),
}

/// A rendered QR raster.
///
/// Cheap to clone. Equality compares pixels; the revision only identifies this particular
/// render.
#[derive(Debug, Clone)]
pub struct QrImage {
    revision: u64,
    pixels: Arc<RgbaImage>,
}

impl QrImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            revision: REVISION_COUNTER.fetch_add(1, Ordering::Relaxed),
            pixels: Arc::new(pixels),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Encodes the raster as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, EncodingError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| EncodingError::Render(e.to_string()))?;
        Ok(bytes)
    }
}

impl PartialEq for QrImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) || self.pixels == other.pixels
    }
}

impl Eq for QrImage {}

/// Renders `payload` synchronously. Same inputs always give identical pixels.
pub fn render(payload: &str, options: &EncodeOptions) -> Result<QrImage, EncodingError> {
    if payload.trim().is_empty() {
        return Err(EncodingError::EmptyPayload);
    }
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&options.width) {
        return Err(EncodingError::InvalidWidth(options.width));
    }

    let code = QrCode::with_error_correction_level(
        payload.as_bytes(),
        options.error_correction.ec_level(),
    )
    .map_err(|e| match e {
        QrError::DataTooLong => EncodingError::DataTooLong {
            bytes: payload.len(),
            level: options.error_correction,
        },
        other => EncodingError::Rejected(other.to_string()),
    })?;

    let modules = u32::try_from(code.width())
        .map_err(|e| EncodingError::Render(format!("symbol too large: {e}")))?;
    let total = modules + 2 * QUIET_ZONE;
    let scale = (options.width / total).max(1);
    let offset = options.width.saturating_sub(total * scale) / 2;
    let origin = offset + QUIET_ZONE * scale;

    let mut canvas = RgbaImage::from_pixel(options.width, options.width, options.light.to_rgba());
    let dark = options.dark.to_rgba();
    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let index = index as u32;
        let x0 = origin + (index % modules) * scale;
        let y0 = origin + (index / modules) * scale;
        for y in y0..(y0 + scale).min(options.width) {
            for x in x0..(x0 + scale).min(options.width) {
                canvas.put_pixel(x, y, dark);
            }
        }
    }

    Ok(QrImage::from_rgba(canvas))
}

/// Stable request/response contract around the encoder.
#[async_trait]
pub trait EncodingGateway: Send + Sync {
    async fn generate(
        &self,
        payload: String,
        options: EncodeOptions,
    ) -> Result<QrImage, EncodingError>;
}

/// Production gateway: renders on Tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrcodeGateway;

#[async_trait]
impl EncodingGateway for QrcodeGateway {
    async fn generate(
        &self,
        payload: String,
        options: EncodeOptions,
    ) -> Result<QrImage, EncodingError> {
        tokio::task::spawn_blocking(move || render(&payload, &options))
            .await
            .map_err(|e| EncodingError::Interrupted(e.to_string()))?
    }
}
