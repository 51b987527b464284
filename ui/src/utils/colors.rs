//! Shared color constants for the UI.

use egui::Color32;

/// Forest green for success toasts and the active scanner indicator.
pub const COLOR_GREEN: Color32 = Color32::from_rgb(34, 139, 34);

/// Red for validation and generation errors.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Amber for in-progress work.
pub const COLOR_AMBER: Color32 = Color32::from_rgb(255, 193, 7);

/// Heart shown on favorited payloads.
pub const COLOR_FAVORITE: Color32 = Color32::from_rgb(232, 62, 140);
