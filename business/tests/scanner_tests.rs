//! Scanner lifecycle with scripted cameras on the real frame loop.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use qrkit_business::{
    EncodeOptions,
    decoding::{
        Camera, CameraError, CameraFacing, CameraProvider, CameraSlot, DecodingGateway,
        FrameLoopGateway, GrayFrame, ScanConfig, StillImageProvider,
    },
    encoding::render,
    scanner::{ScannerSession, ScannerState},
};

fn qr_frame(payload: &str) -> GrayFrame {
    let image = render(payload, &EncodeOptions::default()).unwrap();
    GrayFrame::from_luma(image::DynamicImage::ImageRgba8(image.pixels().clone()).to_luma8())
}

fn blank_frame() -> GrayFrame {
    GrayFrame::new(400, 400, vec![255; 400 * 400]).unwrap()
}

fn fast_config() -> ScanConfig {
    ScanConfig {
        fps: 100,
        ..ScanConfig::default()
    }
}

/// Plays `frames` in order, then fails with a device error.
struct ScriptedCamera {
    frames: std::vec::IntoIter<GrayFrame>,
}

impl Camera for ScriptedCamera {
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, CameraError> {
        match self.frames.next() {
            Some(frame) => Ok(Some(frame)),
            None => Err(CameraError::Device("stream ended".to_owned())),
        }
    }
}

struct ScriptedProvider {
    frames: Vec<GrayFrame>,
}

impl CameraProvider for ScriptedProvider {
    fn open(&self, _facing: CameraFacing) -> Result<Box<dyn Camera>, CameraError> {
        Ok(Box::new(ScriptedCamera {
            frames: self.frames.clone().into_iter(),
        }))
    }
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

fn session(slot: &CameraSlot) -> ScannerSession {
    let _ = env_logger::builder().is_test(true).try_init();
    ScannerSession::new(
        Arc::new(FrameLoopGateway::default()),
        slot.clone(),
        fast_config(),
    )
}

#[test]
fn test_still_image_is_decoded_and_camera_released_on_stop() {
    let slot = CameraSlot::default();
    let mut scanner = session(&slot);
    let provider = StillImageProvider::new(qr_frame("WIFI:T:WPA;S:Home;P:secret;;"));

    scanner.start(&provider).unwrap();
    assert_eq!(scanner.state(), ScannerState::Active);
    assert!(slot.is_busy());

    assert!(wait_until(|| {
        scanner.poll();
        scanner.result().is_some()
    }));
    assert_eq!(
        scanner.result().map(|r| r.text.as_str()),
        Some("WIFI:T:WPA;S:Home;P:secret;;")
    );

    scanner.stop();
    assert_eq!(scanner.state(), ScannerState::Stopped);
    assert!(!slot.is_busy());
    // Stopping again is harmless
    scanner.stop();
}

#[test]
fn test_second_session_cannot_take_a_held_camera() {
    let slot = CameraSlot::default();
    let provider = StillImageProvider::new(blank_frame());
    let mut first = session(&slot);
    let mut second = session(&slot);

    first.start(&provider).unwrap();
    assert_eq!(second.start(&provider), Err(CameraError::Busy));
    assert_eq!(second.state(), ScannerState::Stopped);

    drop(first);
    assert!(second.start(&provider).is_ok());
}

#[test]
fn test_restart_stops_the_previous_scan_first() {
    let slot = CameraSlot::default();
    let provider = StillImageProvider::new(blank_frame());
    let mut scanner = session(&slot);

    scanner.start(&provider).unwrap();
    // Would be Busy if the first lease were still held
    scanner.start(&provider).unwrap();
    assert!(scanner.is_active());
}

#[test]
fn test_lost_stream_returns_to_stopped_with_error() {
    let slot = CameraSlot::default();
    let mut scanner = session(&slot);
    let provider = ScriptedProvider {
        frames: vec![qr_frame("last words")],
    };

    scanner.start(&provider).unwrap();
    assert!(wait_until(|| {
        scanner.poll();
        scanner.state() == ScannerState::Stopped
    }));

    assert_eq!(scanner.result().map(|r| r.text.as_str()), Some("last words"));
    assert!(matches!(scanner.error(), Some(CameraError::Device(_))));
    assert!(!slot.is_busy());
}

#[test]
fn test_repeated_detections_are_collapsed_until_the_code_leaves() {
    let slot = CameraSlot::default();
    let code = qr_frame("same code");
    let frames = vec![
        code.clone(),
        code.clone(),
        code.clone(),
        blank_frame(),
        code.clone(),
        code,
    ];
    let detections = Arc::new(AtomicUsize::new(0));
    let texts = Arc::new(Mutex::new(Vec::new()));

    let gateway = FrameLoopGateway::default();
    let camera = ScriptedProvider { frames }
        .open(CameraFacing::Environment)
        .unwrap();
    let handle = {
        let detections = Arc::clone(&detections);
        let texts = Arc::clone(&texts);
        gateway
            .start_scanning(
                camera,
                slot.acquire().unwrap(),
                &fast_config(),
                Box::new(move |result| {
                    detections.fetch_add(1, Ordering::SeqCst);
                    texts.lock().unwrap().push(result.text);
                }),
            )
            .unwrap()
    };

    assert!(wait_until(|| handle.is_finished()));
    assert!(gateway.stop(handle).is_err());

    assert_eq!(detections.load(Ordering::SeqCst), 2);
    assert_eq!(*texts.lock().unwrap(), vec!["same code", "same code"]);
    assert!(!slot.is_busy());
}
