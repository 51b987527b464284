//! Desktop front end of QR Studio, built on `eframe`.

pub mod app;
pub mod executor;
pub mod state;
pub mod utils;
pub mod widgets;

pub use app::QrStudioApp;
