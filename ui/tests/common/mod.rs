use std::{sync::Arc, time::Duration};

use egui_kittest::Harness;
use qrkit_business::{
    PersistentStore, QrConfig,
    decoding::{CameraProvider, CameraSlot, NoCameraProvider},
};
use qrkit_clipboard::{ClipboardProvider, MemoryClipboard};
use qrkit_ui::{
    QrStudioApp,
    state::{Services, State},
    utils::dialogs::NoDialogs,
};

/// Upper bound on frames stepped while waiting for background work.
pub const MAX_WAIT_STEPS: usize = 500;

pub struct TestCtx<'a, T = State> {
    harness: Harness<'a, T>,
}

impl<'a, T> TestCtx<'a, T> {
    pub fn harness_mut(&mut self) -> &mut Harness<'a, T> {
        &mut self.harness
    }

    #[allow(unused)]
    pub fn harness(&self) -> &Harness<'a, T> {
        &self.harness
    }

    /// Steps frames until `done` holds, yielding to the runtime in between.
    #[allow(unused)]
    pub async fn step_until(&mut self, mut done: impl FnMut(&T) -> bool) -> bool {
        for _ in 0..MAX_WAIT_STEPS {
            self.harness.step();
            if done(self.harness.state()) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl<'a> TestCtx<'a, State> {
    #[allow(unused)]
    pub fn new(app: impl FnMut(&mut egui::Ui, &mut State) + 'a) -> Self {
        init_logger();
        let harness = Harness::new_ui_state(app, State::test());
        Self { harness }
    }
}

impl<'a> TestCtx<'a, QrStudioApp> {
    pub fn new_app() -> Self {
        Self::with_state(State::test())
    }

    #[allow(unused)]
    pub fn with_state(state: State) -> Self {
        init_logger();
        let app = QrStudioApp::new(state);
        let harness = Harness::new_eframe(|_| app);
        Self { harness }
    }
}

/// Collaborators for a custom [`State`]. Must be called inside a Tokio runtime.
#[allow(unused)]
pub struct TestServices {
    pub store: PersistentStore,
    pub clipboard: Arc<dyn ClipboardProvider>,
    pub camera: Box<dyn CameraProvider>,
}

impl Default for TestServices {
    fn default() -> Self {
        Self {
            store: PersistentStore::in_memory(),
            clipboard: Arc::new(MemoryClipboard::default()),
            camera: Box::new(NoCameraProvider),
        }
    }
}

impl TestServices {
    #[allow(unused)]
    pub fn into_state(self) -> State {
        State::new(
            QrConfig::default(),
            Services {
                store: self.store,
                runtime: tokio::runtime::Handle::current(),
                clipboard: self.clipboard,
                dialogs: Box::new(NoDialogs),
                camera: self.camera,
                camera_slot: CameraSlot::default(),
            },
        )
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
