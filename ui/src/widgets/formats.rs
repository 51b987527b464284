//! Formats tab: structured email, phone, SMS, WiFi and contact payloads.

use egui::Ui;
use qrkit_business::{
    export::ExportKind,
    formats::{FormatKind, FormatsForm, WifiSecurity},
};

use super::qr_view;
use crate::state::State;

pub fn formats_tab(state: &mut State, ui: &mut Ui) {
    ui.columns(2, |columns| {
        formats_form(state, &mut columns[0]);
        formats_preview(state, &mut columns[1]);
    });
}

fn formats_form(state: &mut State, ui: &mut Ui) {
    ui.heading("Structured Data");
    ui.horizontal_wrapped(|ui| {
        for kind in FormatKind::ALL {
            ui.selectable_value(&mut state.formats_form.kind, kind, kind.label());
        }
    });
    ui.add_space(8.0);

    fields(ui, &mut state.formats_form);
    ui.add_space(8.0);

    if ui.button("Generate").clicked() {
        state.generate_format();
    }
    qr_view::status(ui, &state.formats);
}

fn fields(ui: &mut Ui, form: &mut FormatsForm) {
    egui::Grid::new("format_fields")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| match form.kind {
            FormatKind::Email => {
                field(ui, "Email Address", &mut form.email.address, "name@example.com");
                field(ui, "Subject", &mut form.email.subject, "Optional");
                ui.label("Body");
                ui.text_edit_multiline(&mut form.email.body);
                ui.end_row();
            }
            FormatKind::Phone => {
                field(ui, "Phone Number", &mut form.phone, "+1 555 0100");
            }
            FormatKind::Sms => {
                field(ui, "Phone Number", &mut form.sms.number, "+1 555 0100");
                ui.label("Message");
                ui.text_edit_multiline(&mut form.sms.message);
                ui.end_row();
            }
            FormatKind::Wifi => {
                field(ui, "Network Name (SSID)", &mut form.wifi.ssid, "MyNetwork");
                ui.label("Password");
                ui.add(egui::TextEdit::singleline(&mut form.wifi.password).password(true));
                ui.end_row();
                ui.label("Security");
                egui::ComboBox::from_id_salt("wifi_security")
                    .selected_text(form.wifi.security.label())
                    .show_ui(ui, |ui| {
                        for security in WifiSecurity::ALL {
                            ui.selectable_value(
                                &mut form.wifi.security,
                                security,
                                security.label(),
                            );
                        }
                    });
                ui.end_row();
            }
            FormatKind::VCard => {
                field(ui, "Full Name", &mut form.vcard.name, "Jane Doe");
                field(ui, "Phone", &mut form.vcard.phone, "Optional");
                field(ui, "Email", &mut form.vcard.email, "Optional");
                field(ui, "Organization", &mut form.vcard.org, "Optional");
                field(ui, "Website", &mut form.vcard.url, "Optional");
            }
        });
}

fn field(ui: &mut Ui, label: &str, value: &mut String, hint: &str) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).hint_text(hint));
    ui.end_row();
}

fn formats_preview(state: &mut State, ui: &mut Ui) {
    let Some(image) = state.formats.image().cloned() else {
        qr_view::empty_preview(ui, "Fill in the form and press Generate.");
        return;
    };

    qr_view::qr_image(ui, &mut state.textures, "formats", &image, 320.0);
    let payload = state.formats.payload().unwrap_or_default().to_owned();
    ui.label(egui::RichText::new(&payload).monospace().small());

    ui.horizontal(|ui| {
        if ui.button("Download").clicked() {
            state.download_image(ExportKind::Format(state.formats_form.kind), &image);
        }
        if ui.button("Copy").clicked() {
            state.copy_text(&payload);
        }
        let favorited = state.shell.history().is_favorited(&payload);
        if qr_view::favorite_button(ui, favorited) {
            state.shell.history_mut().toggle_favorite(&payload);
        }
    });
}
