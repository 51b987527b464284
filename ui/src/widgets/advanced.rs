//! Advanced tab: multi-size preview, batch generation and logo overlay.

use egui::{RichText, Ui};
use qrkit_business::{
    AdvancedMode,
    export::ExportKind,
    logo::{MAX_LOGO_PERCENT, MIN_LOGO_PERCENT},
};

use super::qr_view;
use crate::{state::State, utils::colors::COLOR_RED};

pub fn advanced_tab(state: &mut State, ui: &mut Ui) {
    ui.horizontal(|ui| {
        for mode in AdvancedMode::ALL {
            if ui
                .selectable_label(state.shell.advanced() == mode, mode.label())
                .clicked()
            {
                state.shell.set_advanced(mode);
            }
        }
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| match state.shell.advanced() {
        AdvancedMode::Preview => preview_mode(state, ui),
        AdvancedMode::Batch => batch_mode(state, ui),
        AdvancedMode::Logo => logo_mode(state, ui),
    });
}

fn preview_mode(state: &mut State, ui: &mut Ui) {
    ui.add(
        egui::TextEdit::singleline(state.preview.session.input_mut())
            .hint_text("Enter text or URL")
            .desired_width(f32::INFINITY),
    );
    qr_view::encode_options(ui, &mut state.preview.session);
    if ui.button("Generate Previews").clicked() {
        state.generate_preview();
    }
    qr_view::status(ui, &state.preview.session);

    if let Some(image) = state.preview.session.image().cloned() {
        ui.horizontal(|ui| {
            if ui.button("Download").clicked() {
                state.download_image(ExportKind::Code, &image);
            }
            if ui.button("Copy Text").clicked() {
                let payload = state
                    .preview
                    .session
                    .payload()
                    .unwrap_or_default()
                    .to_owned();
                state.copy_text(&payload);
            }
        });
    }

    let grid = state.preview.grid().to_vec();
    ui.horizontal_wrapped(|ui| {
        for (size, image) in &grid {
            ui.vertical(|ui| {
                let slot = format!("preview-{size}");
                qr_view::qr_image(ui, &mut state.textures, &slot, image, 160.0);
                ui.label(format!("{size}x{size}"));
                if ui.small_button("Download").clicked() {
                    state.download_image(ExportKind::Code, image);
                }
            });
        }
    });
}

fn batch_mode(state: &mut State, ui: &mut Ui) {
    ui.label("One item per line");
    ui.add(
        egui::TextEdit::multiline(state.batch.input_mut())
            .hint_text("https://example.com\nhttps://example.org")
            .desired_rows(6)
            .desired_width(f32::INFINITY),
    );

    ui.horizontal(|ui| {
        if ui
            .add_enabled(!state.batch.is_running(), egui::Button::new("Generate Batch"))
            .clicked()
        {
            state.start_batch();
        }
        if state.batch.is_running() {
            ui.spinner();
            ui.label(format!(
                "Processed {} of {}",
                state.batch.processed(),
                state.batch.total()
            ));
        }
    });

    if let Some(error) = state.batch.validation() {
        ui.colored_label(COLOR_RED, error.message());
    }
    if state.batch.failed() > 0 {
        ui.colored_label(
            COLOR_RED,
            format!("{} line(s) could not be encoded", state.batch.failed()),
        );
    }

    let items = state.batch.items().to_vec();
    if items.is_empty() {
        return;
    }

    if ui
        .button(format!("Download All as HTML ({})", items.len()))
        .clicked()
    {
        state.download_batch();
    }

    let limit = state.config.batch.display_limit;
    ui.horizontal_wrapped(|ui| {
        for item in items.iter().take(limit) {
            ui.vertical(|ui| {
                let slot = format!("batch-{}", item.index);
                qr_view::qr_image(ui, &mut state.textures, &slot, &item.image, 140.0);
                ui.label(RichText::new(&item.text).small());
            });
        }
    });
    if items.len() > limit {
        ui.label(format!("Showing first {limit} of {}", items.len()));
    }
}

fn logo_mode(state: &mut State, ui: &mut Ui) {
    ui.add(
        egui::TextEdit::singleline(state.logo.session.input_mut())
            .hint_text("Enter text or URL")
            .desired_width(f32::INFINITY),
    );

    ui.horizontal(|ui| {
        if ui.button("Choose Logo").clicked() {
            state.pick_logo();
        }
        match state.logo.logo_name() {
            Some(name) => {
                ui.label(name.to_owned());
                if ui.small_button("Remove").clicked() {
                    state.logo.clear_logo();
                }
            }
            None => {
                ui.label("No logo selected");
            }
        }
    });

    let mut percent = state.logo.size_percent();
    ui.horizontal(|ui| {
        ui.label("Logo Size");
        ui.add(
            egui::Slider::new(&mut percent, MIN_LOGO_PERCENT..=MAX_LOGO_PERCENT).suffix("%"),
        );
    });
    state.logo.set_size_percent(percent);

    if ui.button("Generate").clicked() {
        state.generate_logo();
    }
    qr_view::status(ui, &state.logo.session);

    if let Some(composed) = state.logo.composed() {
        qr_view::qr_image(ui, &mut state.textures, "logo", &composed, 320.0);
        if ui.button("Download").clicked() {
            state.download_logo();
        }
    }
}
