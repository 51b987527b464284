//! Advanced → logo overlay.
//!
//! The code is generated with high error correction so that a centered logo covering up to
//! 40% of each dimension still scans. The logo sits on a white padding rectangle.

use std::{sync::Arc, time::Duration};

use image::{
    Rgba, RgbaImage,
    imageops::{self, FilterType},
};

use crate::{
    encoding::{EncodeOptions, ErrorCorrection, QrImage},
    generation::{GenerationMode, GenerationSession},
};

pub const MIN_LOGO_PERCENT: u32 = 10;
pub const MAX_LOGO_PERCENT: u32 = 40;
pub const DEFAULT_LOGO_PERCENT: u32 = 20;
pub const DEFAULT_LOGO_PADDING: u32 = 5;
pub const DEFAULT_LOGO_WIDTH: u32 = 400;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogoError {
    #[error("Failed to load logo image: {0}")]
    Decode(String),
}

/// Draws `logo` centered on `base`, scaled to `percent`% of the canvas in each dimension.
pub fn compose_logo(base: &QrImage, logo: &RgbaImage, percent: u32, padding: u32) -> QrImage {
    let mut canvas = base.pixels().clone();
    let (width, height) = canvas.dimensions();
    let percent = percent.clamp(MIN_LOGO_PERCENT, MAX_LOGO_PERCENT);
    let logo_width = (width * percent / 100).max(1);
    let logo_height = (height * percent / 100).max(1);
    let x = (width - logo_width) / 2;
    let y = (height - logo_height) / 2;

    let white = Rgba([255, 255, 255, 255]);
    let pad_x0 = x.saturating_sub(padding);
    let pad_y0 = y.saturating_sub(padding);
    let pad_x1 = (x + logo_width + padding).min(width);
    let pad_y1 = (y + logo_height + padding).min(height);
    for py in pad_y0..pad_y1 {
        for px in pad_x0..pad_x1 {
            canvas.put_pixel(px, py, white);
        }
    }

    let resized = imageops::resize(logo, logo_width, logo_height, FilterType::Lanczos3);
    imageops::overlay(&mut canvas, &resized, i64::from(x), i64::from(y));
    QrImage::from_rgba(canvas)
}

#[derive(Debug, Clone)]
struct Logo {
    name: String,
    pixels: Arc<RgbaImage>,
    revision: u64,
}

#[derive(Debug, Clone)]
struct Composite {
    base_revision: u64,
    logo_revision: u64,
    percent: u32,
    image: QrImage,
}

#[derive(Debug)]
pub struct LogoSession {
    pub session: GenerationSession,
    logo: Option<Logo>,
    logo_revisions: u64,
    size_percent: u32,
    padding: u32,
    composite: Option<Composite>,
}

impl LogoSession {
    pub fn new(width: u32, size_percent: u32, padding: u32) -> Self {
        Self {
            session: GenerationSession::new(
                GenerationMode::Logo,
                EncodeOptions::plain(width, ErrorCorrection::H),
                Duration::ZERO,
            ),
            logo: None,
            logo_revisions: 0,
            size_percent: size_percent.clamp(MIN_LOGO_PERCENT, MAX_LOGO_PERCENT),
            padding,
            composite: None,
        }
    }

    pub fn size_percent(&self) -> u32 {
        self.size_percent
    }

    pub fn set_size_percent(&mut self, percent: u32) {
        self.size_percent = percent.clamp(MIN_LOGO_PERCENT, MAX_LOGO_PERCENT);
    }

    pub fn logo_name(&self) -> Option<&str> {
        self.logo.as_ref().map(|logo| logo.name.as_str())
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn set_logo(&mut self, name: impl Into<String>, pixels: RgbaImage) {
        self.logo_revisions += 1;
        self.logo = Some(Logo {
            name: name.into(),
            pixels: Arc::new(pixels),
            revision: self.logo_revisions,
        });
    }

    /// Decodes an encoded image file (PNG, JPEG, ...) and uses it as the logo.
    pub fn load_logo(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<(), LogoError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| LogoError::Decode(e.to_string()))?;
        self.set_logo(name, decoded.to_rgba8());
        Ok(())
    }

    pub fn clear_logo(&mut self) {
        self.logo = None;
        self.composite = None;
    }

    /// The image to show and export: the generated code with the logo composed on top,
    /// or the plain code when no logo is set.
    pub fn composed(&mut self) -> Option<QrImage> {
        let base = self.session.image()?.clone();
        let Some(logo) = &self.logo else {
            return Some(base);
        };

        let fresh = self.composite.as_ref().is_some_and(|c| {
            c.base_revision == base.revision()
                && c.logo_revision == logo.revision
                && c.percent == self.size_percent
        });
        if !fresh {
            let image = compose_logo(&base, &logo.pixels, self.size_percent, self.padding);
            self.composite = Some(Composite {
                base_revision: base.revision(),
                logo_revision: logo.revision,
                percent: self.size_percent,
                image,
            });
        }
        self.composite.as_ref().map(|c| c.image.clone())
    }
}
