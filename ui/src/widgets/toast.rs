//! Short-lived status notices ("Copied!", saved files, export failures).

use std::time::{Duration, Instant};

use egui::{Align2, Color32, Context, RichText};

use crate::utils::colors::{COLOR_GREEN, COLOR_RED};

pub const TOAST_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(text.into(), ToastKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(text.into(), ToastKind::Error);
    }

    fn push(&mut self, text: String, kind: ToastKind) {
        self.items.push(Toast {
            text,
            kind,
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    /// Drops expired toasts and returns when the next one expires.
    pub fn prune(&mut self, now: Instant) -> Option<Instant> {
        self.items.retain(|toast| toast.expires_at > now);
        self.items.iter().map(|toast| toast.expires_at).min()
    }
}

/// Renders the live toasts stacked at the bottom of the window.
pub fn toasts(toasts: &Toasts, ctx: &Context) {
    if toasts.items().is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for toast in toasts.items() {
                let fill = match toast.kind {
                    ToastKind::Success => COLOR_GREEN,
                    ToastKind::Error => COLOR_RED,
                };
                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(12, 6))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&toast.text).color(Color32::WHITE));
                    });
                ui.add_space(4.0);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_their_duration() {
        let mut toasts = Toasts::default();
        toasts.success("Copied!");
        let created = Instant::now();

        assert!(toasts.prune(created).is_some());
        assert_eq!(toasts.items().len(), 1);

        assert!(toasts.prune(created + TOAST_DURATION * 2).is_none());
        assert!(toasts.items().is_empty());
    }
}
