//! Scanner tab.

use egui::{RichText, Ui};
use qrkit_business::scanner::ScannerState;

use crate::{
    state::State,
    utils::colors::{COLOR_GREEN, COLOR_RED},
};

/// Whether scanned text can be opened in a browser or mail client.
pub fn is_openable(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:", "tel:", "sms:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

pub fn scanner_tab(state: &mut State, ui: &mut Ui) {
    ui.heading("QR Code Scanner");
    ui.label("Use your camera to scan QR codes and decode the data.");
    ui.add_space(8.0);

    if let Some(error) = state.scanner.error() {
        ui.colored_label(COLOR_RED, error.user_message());
    }

    ui.horizontal(|ui| match state.scanner.state() {
        ScannerState::Stopped => {
            if ui.button("Start Camera").clicked() {
                state.start_camera();
            }
            if ui.button("Scan Image File").clicked() {
                state.scan_image_file();
            }
        }
        ScannerState::Starting => {
            ui.spinner();
            ui.label("Starting camera...");
        }
        ScannerState::Active => {
            ui.colored_label(COLOR_GREEN, "● Scanning");
            if ui.button("Stop Camera").clicked() {
                state.scanner.stop();
            }
        }
    });

    let Some(result) = state.scanner.result().cloned() else {
        return;
    };

    ui.add_space(12.0);
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.label(RichText::new("Scanned Code").strong());
        ui.label(RichText::new(&result.text).monospace());
        ui.label(
            RichText::new(result.detected_at.format("%Y-%m-%d %H:%M:%S").to_string()).small(),
        );
        ui.horizontal(|ui| {
            if is_openable(&result.text) && ui.button("Open Link").clicked() {
                ui.ctx()
                    .open_url(egui::OpenUrl::new_tab(result.text.trim()));
            }
            if ui.button("Copy").clicked() {
                state.copy_text(&result.text);
            }
            if ui.button("Clear").clicked() {
                state.scanner.clear_result();
            }
        });
    });
}
