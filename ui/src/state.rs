//! Everything the UI owns: the shell, one session per tab, and the job executor.
//!
//! Widgets read from [`State`] and trigger the action methods defined here. Anything that
//! needs a gateway goes through [`Executor`], and outcomes come back through
//! [`State::poll`] on the UI thread.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Local;
use qrkit_business::{
    EncodeOptions, ErrorCorrection, PersistentStore, QrConfig, QrImage, Shell, Tab,
    batch::BatchSession,
    decoding::{
        CameraProvider, CameraSlot, FrameLoopGateway, NoCameraProvider, StillImageProvider,
    },
    encoding::QrcodeGateway,
    export::{ExportKind, batch_html, download_filename},
    formats::FormatsForm,
    generation::{GenerationMode, GenerationSession},
    logo::LogoSession,
    preview::MultiSizePreview,
    scanner::ScannerSession,
};
use qrkit_clipboard::{ClipboardProvider, MemoryClipboard};
use tokio::runtime::Handle;

use crate::{
    executor::{Executor, Outcome, Target},
    utils::{
        dialogs::{FileDialogs, NoDialogs},
        textures::QrTextures,
    },
    widgets::toast::Toasts,
};

/// Repaint interval while the scanner is running, so detections show up promptly.
const SCANNER_POLL: Duration = Duration::from_millis(100);

pub struct State {
    pub config: QrConfig,
    pub shell: Shell,
    pub simple: GenerationSession,
    pub formats_form: FormatsForm,
    pub formats: GenerationSession,
    pub preview: MultiSizePreview,
    pub batch: BatchSession,
    pub logo: LogoSession,
    pub scanner: ScannerSession,
    pub toasts: Toasts,
    pub textures: QrTextures,
    /// The "Clear All" history confirmation is open.
    pub confirm_clear: bool,
    camera: Box<dyn CameraProvider>,
    executor: Executor,
    clipboard: Arc<dyn ClipboardProvider>,
    dialogs: Box<dyn FileDialogs>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("tab", &self.shell.tab())
            .field("theme", &self.shell.theme())
            .field("simple", &self.simple)
            .field("scanner", &self.scanner)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

/// Collaborators that differ between the desktop app and tests.
pub struct Services {
    pub store: PersistentStore,
    pub runtime: Handle,
    pub clipboard: Arc<dyn ClipboardProvider>,
    pub dialogs: Box<dyn FileDialogs>,
    pub camera: Box<dyn CameraProvider>,
    pub camera_slot: CameraSlot,
}

impl State {
    pub fn new(config: QrConfig, services: Services) -> Self {
        let debounce = config.debounce();
        let Services {
            store,
            runtime,
            clipboard,
            dialogs,
            camera,
            camera_slot,
        } = services;

        Self {
            shell: Shell::load(store, config.history.limit),
            simple: GenerationSession::new(
                GenerationMode::Simple,
                config.encode_options(),
                debounce,
            ),
            formats_form: FormatsForm::default(),
            formats: GenerationSession::new(
                GenerationMode::Formats,
                EncodeOptions::plain(400, ErrorCorrection::M),
                debounce,
            ),
            preview: MultiSizePreview::new(
                config.encode_options(),
                debounce,
                config.preview.sizes.clone(),
            ),
            batch: BatchSession::new(config.batch.width),
            logo: LogoSession::new(
                config.logo.width,
                config.logo.size_percent,
                config.logo.padding,
            ),
            scanner: ScannerSession::new(
                Arc::new(FrameLoopGateway::default()),
                camera_slot,
                config.scanner,
            ),
            toasts: Toasts::default(),
            textures: QrTextures::default(),
            confirm_clear: false,
            camera,
            executor: Executor::new(runtime, Arc::new(QrcodeGateway)),
            clipboard,
            dialogs,
            config,
        }
    }

    /// In-memory state for tests: default config, no camera, no dialogs, a private camera
    /// slot and clipboard. Must be called inside a Tokio runtime.
    pub fn test() -> Self {
        Self::with_clipboard(Arc::new(MemoryClipboard::default()))
    }

    pub fn with_clipboard(clipboard: Arc<dyn ClipboardProvider>) -> Self {
        Self::new(
            QrConfig::default(),
            Services {
                store: PersistentStore::in_memory(),
                runtime: Handle::current(),
                clipboard,
                dialogs: Box::new(NoDialogs),
                camera: Box::new(NoCameraProvider),
                camera_slot: CameraSlot::default(),
            },
        )
    }

    pub fn attach(&mut self, ctx: &egui::Context) {
        self.executor.attach(ctx);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.shell.select_tab(tab) {
            log::info!("Left the scanner tab, stopping camera");
            self.scanner.stop();
        }
    }

    pub fn generate_simple(&mut self) {
        if let Ok(pending) = self.simple.generate() {
            self.executor.spawn_generation(Target::Simple, pending);
        }
    }

    pub fn generate_format(&mut self) {
        match self.formats_form.payload() {
            Ok(payload) => {
                if let Ok(pending) = self.formats.submit(payload) {
                    self.executor.spawn_generation(Target::Formats, pending);
                }
            }
            Err(error) => self.formats.reject(error),
        }
    }

    pub fn generate_preview(&mut self) {
        if let Ok((main, grid)) = self.preview.generate() {
            self.executor.spawn_generation(Target::Preview, main);
            self.executor.spawn_grid(grid);
        }
    }

    pub fn generate_logo(&mut self) {
        if let Ok(pending) = self.logo.session.generate() {
            self.executor.spawn_generation(Target::Logo, pending);
        }
    }

    pub fn start_batch(&mut self) {
        if let Ok(pending) = self.batch.start() {
            self.executor.spawn_batch(pending);
        }
    }

    pub fn start_camera(&mut self) {
        if let Err(e) = self.scanner.start(self.camera.as_ref()) {
            log::warn!("Camera failed to start: {e}");
        }
    }

    /// Scans a still image picked from disk in place of the camera.
    pub fn scan_image_file(&mut self) {
        let Some(file) = self.dialogs.pick_image("Select an image to scan") else {
            return;
        };
        match StillImageProvider::from_encoded(&file.bytes) {
            Ok(provider) => {
                if let Err(e) = self.scanner.start(&provider) {
                    log::warn!("Could not scan {}: {e}", file.name);
                }
            }
            Err(e) => {
                log::warn!("Could not read {} as an image: {e}", file.name);
                self.toasts.error(e.user_message());
            }
        }
    }

    pub fn pick_logo(&mut self) {
        let Some(file) = self.dialogs.pick_image("Select a logo") else {
            return;
        };
        if let Err(e) = self.logo.load_logo(file.name, &file.bytes) {
            log::warn!("Logo rejected: {e}");
            self.toasts.error(e.to_string());
        }
    }

    /// Copies `text` and confirms with a toast. Failures are only logged.
    pub fn copy_text(&mut self, text: &str) {
        match self.clipboard.set_text(text) {
            Ok(()) => self.toasts.success("Copied!"),
            Err(e) => log::warn!("Copy to clipboard failed: {e}"),
        }
    }

    /// Offers `image` for download as PNG.
    pub fn download_image(&mut self, kind: ExportKind, image: &QrImage) {
        match image.to_png() {
            Ok(bytes) => self.save(kind, &bytes),
            Err(e) => {
                log::warn!("PNG export failed: {e}");
                self.toasts.error(e.to_string());
            }
        }
    }

    /// Offers the logo-mode artifact, composed with the logo if one is loaded.
    pub fn download_logo(&mut self) {
        let with_logo = self.logo.has_logo();
        if let Some(image) = self.logo.composed() {
            self.download_image(ExportKind::Logo { with_logo }, &image);
        }
    }

    pub fn download_batch(&mut self) {
        match batch_html(self.batch.items()) {
            Ok(html) => self.save(ExportKind::BatchSheet, html.as_bytes()),
            Err(e) => {
                log::warn!("Batch export failed: {e}");
                self.toasts.error(e.to_string());
            }
        }
    }

    fn save(&mut self, kind: ExportKind, bytes: &[u8]) {
        let file_name = download_filename(kind, Local::now());
        match self.dialogs.save(&file_name, bytes) {
            Ok(Some(path)) => self.toasts.success(format!("Saved {}", path.display())),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Writing {file_name} failed: {e}");
                self.toasts.error(format!("Could not save {file_name}"));
            }
        }
    }

    /// Applies every finished job and issues any debounced regeneration that is due.
    ///
    /// Returns the next moment something needs a repaint, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        for outcome in self.executor.drain() {
            self.apply(outcome);
        }

        if let Some(pending) = self.simple.poll_debounced(now) {
            self.executor.spawn_generation(Target::Simple, pending);
        }
        if let Some(pending) = self.formats.poll_debounced(now) {
            self.executor.spawn_generation(Target::Formats, pending);
        }
        if let Some((main, grid)) = self.preview.poll_debounced(now) {
            self.executor.spawn_generation(Target::Preview, main);
            self.executor.spawn_grid(grid);
        }
        if let Some(pending) = self.logo.session.poll_debounced(now) {
            self.executor.spawn_generation(Target::Logo, pending);
        }

        self.scanner.poll();

        [
            self.simple.next_deadline(),
            self.formats.next_deadline(),
            self.preview.session.next_deadline(),
            self.logo.session.next_deadline(),
            self.toasts.prune(now),
            self.scanner.is_active().then(|| now + SCANNER_POLL),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Whether any generation or batch is still running.
    pub fn is_busy(&self) -> bool {
        self.simple.is_pending()
            || self.formats.is_pending()
            || self.preview.session.is_pending()
            || self.logo.session.is_pending()
            || self.batch.is_running()
    }

    fn apply(&mut self, outcome: Outcome) {
        let history = self.shell.history_mut();
        match outcome {
            Outcome::Generation(Target::Simple, completion) => {
                self.simple.apply(completion, history);
            }
            Outcome::Generation(Target::Formats, completion) => {
                self.formats.apply(completion, history);
            }
            Outcome::Generation(Target::Preview, completion) => {
                self.preview.session.apply(completion, history);
            }
            Outcome::Generation(Target::Logo, completion) => {
                self.logo.session.apply(completion, history);
            }
            Outcome::Grid(completion) => {
                self.preview.apply_grid(completion);
            }
            Outcome::Batch(event) => {
                self.batch.apply(event, history);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_option_change_schedules_a_wakeup() {
        let mut state = State::test();
        let now = Instant::now();
        assert!(state.poll(now).is_none());

        state.simple.set_input("debounced");
        state.generate_simple();
        state.simple.set_width(300);

        let wakeup = state.poll(Instant::now()).unwrap();
        assert!(wakeup <= Instant::now() + state.config.debounce());
        assert!(state.is_busy());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_format_leaves_formats_idle() {
        let mut state = State::test();
        state.formats_form.kind = qrkit_business::formats::FormatKind::Phone;
        state.formats_form.phone = "   ".to_owned();

        state.generate_format();

        assert_eq!(
            state.formats.validation().map(|e| e.message()),
            Some("Please enter a phone number")
        );
        assert!(!state.formats.is_pending());
    }
}
