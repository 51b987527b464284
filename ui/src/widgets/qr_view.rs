//! Pieces shared by every generating tab: option controls, status line and the code itself.

use egui::{Color32, RichText, Ui};
use qrkit_business::{
    ErrorCorrection, QrColor, QrImage,
    encoding::{MAX_WIDTH, MIN_WIDTH},
    generation::{GenerationSession, GenerationState},
};

use crate::utils::{
    colors::{COLOR_AMBER, COLOR_FAVORITE, COLOR_RED},
    textures::QrTextures,
};

/// Size, error correction and colors. Changes go through the session setters, which
/// schedule a debounced regeneration.
pub fn encode_options(ui: &mut Ui, session: &mut GenerationSession) {
    let mut options = *session.options();

    ui.horizontal(|ui| {
        ui.label("Size");
        ui.add(egui::Slider::new(&mut options.width, MIN_WIDTH..=MAX_WIDTH).suffix(" px"));
    });

    egui::ComboBox::from_label("Error Correction")
        .selected_text(options.error_correction.label())
        .show_ui(ui, |ui| {
            for level in ErrorCorrection::ALL {
                ui.selectable_value(&mut options.error_correction, level, level.label());
            }
        });

    ui.horizontal(|ui| {
        color_field(ui, "Dark Modules", &mut options.dark);
        ui.add_space(16.0);
        color_field(ui, "Background", &mut options.light);
    });

    session.set_width(options.width);
    session.set_error_correction(options.error_correction);
    session.set_dark(options.dark);
    session.set_light(options.light);
}

fn color_field(ui: &mut Ui, label: &str, color: &mut QrColor) {
    ui.label(label);
    let mut rgb = [color.r, color.g, color.b];
    if ui.color_edit_button_srgb(&mut rgb).changed() {
        *color = QrColor::rgb(rgb[0], rgb[1], rgb[2]);
    }
    ui.monospace(color.to_string());
}

/// Validation message, progress or encoder error of `session`.
pub fn status(ui: &mut Ui, session: &GenerationSession) {
    if let Some(error) = session.validation() {
        ui.colored_label(COLOR_RED, error.message());
        return;
    }
    match session.state() {
        GenerationState::Pending => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.colored_label(COLOR_AMBER, "Generating...");
            });
        }
        GenerationState::Failed(error) => {
            ui.colored_label(COLOR_RED, error.to_string());
        }
        GenerationState::Idle | GenerationState::Ready(_) => {}
    }
}

/// Draws `image` at most `max_side` points wide, cached under `slot`.
pub fn qr_image(
    ui: &mut Ui,
    textures: &mut QrTextures,
    slot: &str,
    image: &QrImage,
    max_side: f32,
) {
    let texture = textures.get(ui.ctx(), slot, image);
    let side = (image.width() as f32).min(max_side);
    ui.add(egui::Image::new(&texture).fit_to_exact_size(egui::vec2(side, side)));
}

/// The favorite toggle shown under a generated code.
pub fn favorite_button(ui: &mut Ui, favorited: bool) -> bool {
    let (icon, color) = if favorited {
        ("♥", COLOR_FAVORITE)
    } else {
        ("♡", ui.visuals().text_color())
    };
    ui.button(RichText::new(format!("{icon} Favorite")).color(color))
        .clicked()
}

/// Placeholder for a tab that has nothing to show yet.
pub fn empty_preview(ui: &mut Ui, hint: &str) {
    ui.label(RichText::new(hint).color(Color32::GRAY));
}
