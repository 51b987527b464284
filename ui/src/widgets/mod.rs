mod advanced;
mod formats;
mod history;
mod qr_view;
mod scanner;
mod simple;
pub mod toast;

pub use advanced::advanced_tab;
pub use formats::formats_tab;
pub use history::history_tab;
pub use scanner::{is_openable, scanner_tab};
pub use simple::simple_tab;
pub use toast::toasts;
