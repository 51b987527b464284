//! Simple tab: free text or URL in, one code out.

use egui::Ui;
use qrkit_business::export::ExportKind;

use super::qr_view;
use crate::state::State;

pub fn simple_tab(state: &mut State, ui: &mut Ui) {
    ui.columns(2, |columns| {
        simple_form(state, &mut columns[0]);
        simple_preview(state, &mut columns[1]);
    });
}

fn simple_form(state: &mut State, ui: &mut Ui) {
    ui.heading("Text or URL");
    ui.add(
        egui::TextEdit::multiline(state.simple.input_mut())
            .hint_text("Enter text or URL")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(8.0);

    qr_view::encode_options(ui, &mut state.simple);
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        if ui.button("Generate").clicked() {
            state.generate_simple();
        }
        if ui.button("Clear").clicked() {
            state.simple.clear();
        }
        let payload = state
            .simple
            .image()
            .and(state.simple.payload())
            .map(str::to_owned);
        let copy = ui
            .add_enabled(payload.is_some(), egui::Button::new("Copy Text"))
            .clicked();
        if let Some(payload) = payload.filter(|_| copy) {
            state.copy_text(&payload);
        }
    });

    qr_view::status(ui, &state.simple);
}

fn simple_preview(state: &mut State, ui: &mut Ui) {
    let Some(image) = state.simple.image().cloned() else {
        qr_view::empty_preview(ui, "Try an example: https://example.com");
        return;
    };

    qr_view::qr_image(ui, &mut state.textures, "simple", &image, 320.0);
    let payload = state.simple.payload().unwrap_or_default().to_owned();

    ui.horizontal(|ui| {
        if ui.button("Download").clicked() {
            state.download_image(ExportKind::Code, &image);
        }
        let favorited = state.shell.history().is_favorited(&payload);
        if qr_view::favorite_button(ui, favorited) {
            state.shell.history_mut().toggle_favorite(&payload);
        }
    });
}
