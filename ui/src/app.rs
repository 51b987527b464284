use std::time::Instant;

use qrkit_business::{Tab, ThemeState};

use crate::{state::State, widgets};

pub struct QrStudioApp {
    pub state: State,
}

impl QrStudioApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

impl eframe::App for QrStudioApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.attach(ctx);
        let next_wakeup = self.state.poll(Instant::now());

        ctx.set_visuals(match self.state.shell.theme() {
            ThemeState::Dark => egui::Visuals::dark(),
            ThemeState::Light => egui::Visuals::light(),
        });

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.strong("QR Studio");
                ui.separator();
                for tab in Tab::ALL {
                    if ui
                        .selectable_label(self.state.shell.tab() == tab, tab.label())
                        .clicked()
                    {
                        self.state.select_tab(tab);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    theme_toggle(&mut self.state, ui);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.shell.tab() {
            Tab::Simple => widgets::simple_tab(&mut self.state, ui),
            Tab::Formats => widgets::formats_tab(&mut self.state, ui),
            Tab::Advanced => widgets::advanced_tab(&mut self.state, ui),
            Tab::Scanner => widgets::scanner_tab(&mut self.state, ui),
            Tab::History => widgets::history_tab(&mut self.state, ui),
        });

        widgets::toasts(&self.state.toasts, ctx);

        if let Some(at) = next_wakeup {
            ctx.request_repaint_after(at.saturating_duration_since(Instant::now()));
        }
    }
}

fn theme_toggle(state: &mut State, ui: &mut egui::Ui) {
    let label = match state.shell.theme() {
        ThemeState::Dark => "☀ Light",
        ThemeState::Light => "🌙 Dark",
    };
    if ui.button(label).on_hover_text("Toggle theme").clicked() {
        let theme = state.shell.toggle_theme();
        log::info!("Switched to {} theme", theme.as_stored());
    }
}
