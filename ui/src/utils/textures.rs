//! Uploads generated codes to the GPU once per revision.

use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use qrkit_business::QrImage;

/// Converts an artifact into an egui image.
pub fn color_image(image: &QrImage) -> ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, image.pixels().as_raw())
}

/// Texture cache keyed by display slot. A slot is re-uploaded only when the artifact shown in
/// it changes revision.
#[derive(Default)]
pub struct QrTextures {
    slots: HashMap<String, (u64, TextureHandle)>,
}

impl std::fmt::Debug for QrTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrTextures")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl QrTextures {
    pub fn get(&mut self, ctx: &Context, slot: &str, image: &QrImage) -> TextureHandle {
        match self.slots.get(slot) {
            Some((revision, texture)) if *revision == image.revision() => return texture.clone(),
            _ => {}
        }

        // Nearest keeps module edges crisp when the code is scaled down
        let texture = ctx.load_texture(slot, color_image(image), TextureOptions::NEAREST);
        self.slots
            .insert(slot.to_owned(), (image.revision(), texture.clone()));
        texture
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrkit_business::{EncodeOptions, encoding::render};

    #[test]
    fn test_color_image_matches_artifact_size() {
        let image = render("texture", &EncodeOptions::default()).unwrap();
        let color = color_image(&image);

        assert_eq!(color.size, [400, 400]);
        assert_eq!(color.pixels[0], egui::Color32::WHITE);
    }

    #[test]
    fn test_same_revision_reuses_texture() {
        let ctx = Context::default();
        let mut textures = QrTextures::default();
        let image = render("cached", &EncodeOptions::default()).unwrap();

        let first = textures.get(&ctx, "simple", &image);
        let second = textures.get(&ctx, "simple", &image);
        assert_eq!(first.id(), second.id());

        let other = render("other", &EncodeOptions::default()).unwrap();
        let third = textures.get(&ctx, "simple", &other);
        assert_ne!(first.id(), third.id());
        assert_eq!(textures.len(), 1);
    }
}
