//! Scanner tab with and without a frame source.

use std::sync::Arc;

use crate::common::{TestCtx, TestServices};
use kittest::Queryable;
use qrkit_business::{
    EncodeOptions, Tab,
    decoding::{CAMERA_ACCESS_MESSAGE, StillImageProvider},
    encoding::render,
    scanner::ScannerState,
};
use qrkit_clipboard::MemoryClipboard;

mod common;

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_camera_shows_access_message() {
    let mut ctx = TestCtx::new_app();
    ctx.harness_mut().state_mut().state.select_tab(Tab::Scanner);
    let harness = ctx.harness_mut();
    harness.step();

    harness.get_by_label("Start Camera").click();
    harness.step();
    harness.step();

    assert_eq!(harness.state().state.scanner.state(), ScannerState::Stopped);
    assert!(harness.query_by_label(CAMERA_ACCESS_MESSAGE).is_some());
    assert!(
        harness.query_by_label("Start Camera").is_some(),
        "Scanner can be retried"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scanned_link_can_be_copied() {
    let code = render("https://example.com/scanned", &EncodeOptions::default()).unwrap();
    let clipboard = Arc::new(MemoryClipboard::default());
    let mut state = TestServices {
        clipboard: clipboard.clone(),
        camera: Box::new(StillImageProvider::from_encoded(&code.to_png().unwrap()).unwrap()),
        ..TestServices::default()
    }
    .into_state();
    state.select_tab(Tab::Scanner);

    let mut ctx = TestCtx::with_state(state);
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label("Start Camera").click();
    let scanned = ctx
        .step_until(|app| app.state.scanner.result().is_some())
        .await;
    assert!(scanned, "Code should be decoded from the frame source");

    let harness = ctx.harness_mut();
    harness.step();
    assert!(harness.query_by_label("Open Link").is_some());

    harness.get_by_label("Copy").click();
    harness.step();
    harness.step();
    assert_eq!(
        clipboard.contents().as_deref(),
        Some("https://example.com/scanned")
    );

    harness.get_by_label("Stop Camera").click();
    harness.step();
    harness.step();
    assert_eq!(harness.state().state.scanner.state(), ScannerState::Stopped);
}
