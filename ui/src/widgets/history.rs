//! History tab: favorites first, then every generated payload, newest on top.

use egui::{RichText, Ui};
use qrkit_business::{Confirmation, HistoryEntry, formats::share_via_email};

use crate::state::State;

enum EntryAction {
    Copy(String),
    Share(String),
    Remove(i64),
}

pub fn history_tab(state: &mut State, ui: &mut Ui) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        favorites_section(state, ui);
        ui.add_space(16.0);
        history_section(state, ui);
    });

    if state.confirm_clear {
        confirm_clear(state, ui);
    }
}

fn favorites_section(state: &mut State, ui: &mut Ui) {
    ui.heading("Favorites");
    let favorites = state.shell.history().favorites().to_vec();
    if favorites.is_empty() {
        ui.label("No favorites yet.");
        return;
    }

    for entry in &favorites {
        match entry_row(ui, entry, "Remove") {
            Some(EntryAction::Remove(id)) => {
                state.shell.history_mut().remove_favorite(id);
            }
            Some(action) => run(state, ui, action),
            None => {}
        }
    }
}

fn history_section(state: &mut State, ui: &mut Ui) {
    let entries = state.shell.history().history().to_vec();

    ui.horizontal(|ui| {
        ui.heading("Generated QR Code History");
        if ui
            .add_enabled(!entries.is_empty(), egui::Button::new("Clear All"))
            .clicked()
        {
            state.confirm_clear = true;
        }
    });

    if entries.is_empty() {
        ui.label("No QR codes generated yet.");
        ui.label("Go to Simple or Formats tab to create and save history.");
        return;
    }

    for entry in &entries {
        match entry_row(ui, entry, "Delete") {
            Some(EntryAction::Remove(id)) => {
                state.shell.history_mut().remove_item(id);
            }
            Some(action) => run(state, ui, action),
            None => {}
        }
    }
}

fn entry_row(ui: &mut Ui, entry: &HistoryEntry, remove_label: &str) -> Option<EntryAction> {
    let mut action = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(&entry.data);
                ui.label(RichText::new(&entry.timestamp).small().weak());
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button(remove_label).clicked() {
                    action = Some(EntryAction::Remove(entry.id));
                }
                if ui.small_button("Share").clicked() {
                    action = Some(EntryAction::Share(entry.data.clone()));
                }
                if ui.small_button("Copy").clicked() {
                    action = Some(EntryAction::Copy(entry.data.clone()));
                }
            });
        });
    });
    action
}

fn run(state: &mut State, ui: &Ui, action: EntryAction) {
    match action {
        EntryAction::Copy(data) => state.copy_text(&data),
        EntryAction::Share(data) => {
            ui.ctx()
                .open_url(egui::OpenUrl::new_tab(share_via_email(&data)));
        }
        EntryAction::Remove(_) => {}
    }
}

fn confirm_clear(state: &mut State, ui: &Ui) {
    let mut answer = None;
    let modal = egui::Modal::new(egui::Id::new("confirm_clear_history")).show(ui.ctx(), |ui| {
        ui.label("Clear all history?");
        ui.horizontal(|ui| {
            if ui.button("OK").clicked() {
                answer = Some(Confirmation::Confirmed);
            }
            if ui.button("Cancel").clicked() {
                answer = Some(Confirmation::Declined);
            }
        });
    });
    if answer.is_none() && modal.should_close() {
        answer = Some(Confirmation::Declined);
    }

    if let Some(answer) = answer {
        state.shell.history_mut().clear_history(answer);
        state.confirm_clear = false;
    }
}
