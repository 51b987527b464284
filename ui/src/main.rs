#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::sync::Arc;

use qrkit_business::{
    PersistentStore, QrConfig,
    decoding::{CameraSlot, NoCameraProvider},
    store::FileStore,
};
use qrkit_clipboard::SystemClipboard;
use qrkit_ui::{
    state::{Services, State},
    utils::dialogs::SystemDialogs,
};

mod alloc {
    #[global_allocator]
    static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
}

fn load_config() -> QrConfig {
    match QrConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Falling back to default configuration: {e:#}");
            QrConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    // Filter out egui_winit clipboard errors - they occur when clipboard content
    // is not in a supported text format.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_module("egui_winit::clipboard", log::LevelFilter::Off)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("qrkit-worker")
        .enable_all()
        .build()
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;

    let config = load_config();
    let store_path = FileStore::default_path();
    log::info!("Using storage at {}", store_path.display());

    let services = Services {
        store: PersistentStore::new(Arc::new(FileStore::open(store_path))),
        runtime: runtime.handle().clone(),
        clipboard: Arc::new(SystemClipboard),
        dialogs: Box::new(SystemDialogs),
        camera: Box::new(NoCameraProvider),
        camera_slot: CameraSlot::process(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("QR Studio")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "QR Studio",
        native_options,
        Box::new(move |_cc| {
            let state = State::new(config, services);
            Ok(Box::new(qrkit_ui::QrStudioApp::new(state)))
        }),
    )
}
