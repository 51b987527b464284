//! Camera frames in, decoded QR text out.
//!
//! Camera hardware is reached only through [`CameraProvider`] and [`Camera`]; the detector
//! only through [`FrameDecoder`]. [`FrameLoopGateway`] ties them together on a dedicated
//! worker thread that owns the camera and its [`CameraLease`] until it is stopped.

use std::{
    sync::{
        Arc, LazyLock,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{DateTime, Local};
use image::GrayImage;
use serde::{Deserialize, Serialize};

pub const CAMERA_ACCESS_MESSAGE: &str =
    "Unable to access camera. Make sure you have granted permission.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("No camera found: {0}")]
    NotFound(String),
    #[error("Camera is already in use")]
    Busy,
    #[error("Camera device error: {0}")]
    Device(String),
    #[error("Failed to initialise scanner: {0}")]
    Init(String),
}

impl CameraError {
    /// Message shown in the scanner panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied | Self::NotFound(_) => CAMERA_ACCESS_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    User,
    #[default]
    Environment,
}

/// An 8-bit grayscale frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayFrame {
    /// Row-major luma samples. Returns `None` if `pixels` does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_luma(image: GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// The centered `size × size` square, shrunk to fit the frame.
    pub fn crop_center(&self, size: u32) -> Self {
        let size = size.min(self.width).min(self.height);
        let x0 = (self.width - size) / 2;
        let y0 = (self.height - size) / 2;
        let mut pixels = Vec::with_capacity((size as usize) * (size as usize));
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                pixels.push(self.pixel(x, y));
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

/// A running frame source.
pub trait Camera: Send {
    /// The next frame. `Ok(None)` means no new frame is ready yet; an error ends the stream.
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, CameraError>;
}

/// Opens cameras. Dropping the returned [`Camera`] releases the device.
pub trait CameraProvider {
    fn open(&self, facing: CameraFacing) -> Result<Box<dyn Camera>, CameraError>;
}

/// Provider for machines without a camera.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCameraProvider;

impl CameraProvider for NoCameraProvider {
    fn open(&self, _facing: CameraFacing) -> Result<Box<dyn Camera>, CameraError> {
        Err(CameraError::NotFound("no video input device".to_owned()))
    }
}

/// Serves one still image as an endless stream of identical frames.
#[derive(Debug, Clone)]
pub struct StillImageProvider {
    frame: GrayFrame,
}

impl StillImageProvider {
    pub fn new(frame: GrayFrame) -> Self {
        Self { frame }
    }

    /// Decodes an encoded image file into the frame to serve.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, CameraError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| CameraError::Device(e.to_string()))?;
        Ok(Self::new(GrayFrame::from_luma(image.to_luma8())))
    }
}

struct StillImageCamera {
    frame: GrayFrame,
}

impl Camera for StillImageCamera {
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, CameraError> {
        Ok(Some(self.frame.clone()))
    }
}

impl CameraProvider for StillImageProvider {
    fn open(&self, _facing: CameraFacing) -> Result<Box<dyn Camera>, CameraError> {
        Ok(Box::new(StillImageCamera {
            frame: self.frame.clone(),
        }))
    }
}

/// QR detector over grayscale frames.
pub trait FrameDecoder: Send + Sync {
    /// Text of the first decodable code in `frame`, if any.
    fn decode(&self, frame: &GrayFrame) -> Option<String>;
}

/// Detector backed by the `rqrr` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl FrameDecoder for RqrrDecoder {
    fn decode(&self, frame: &GrayFrame) -> Option<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width() as usize,
            frame.height() as usize,
            |x, y| frame.pixel(x as u32, y as u32),
        );
        prepared.detect_grids().into_iter().find_map(|grid| match grid.decode() {
            Ok((_meta, text)) => Some(text),
            Err(e) => {
                log::debug!("Found a QR grid but could not decode it: {e:?}");
                None
            }
        })
    }
}

static PROCESS_SLOT: LazyLock<CameraSlot> = LazyLock::new(CameraSlot::default);

/// Guards the single camera. At most one [`CameraLease`] exists per slot.
#[derive(Debug, Clone, Default)]
pub struct CameraSlot {
    busy: Arc<AtomicBool>,
}

impl CameraSlot {
    /// The slot shared by every scanner in this process.
    pub fn process() -> Self {
        PROCESS_SLOT.clone()
    }

    pub fn acquire(&self) -> Result<CameraLease, CameraError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_e| CameraError::Busy)?;
        Ok(CameraLease {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Exclusive right to use the camera, released on drop.
#[derive(Debug)]
pub struct CameraLease {
    busy: Arc<AtomicBool>,
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub fps: u32,
    /// Edge of the centered square that is searched, in pixels. `None` searches the whole
    /// frame.
    pub detection_box: Option<u32>,
    pub facing: CameraFacing,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            detection_box: None,
            facing: CameraFacing::Environment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub text: String,
    pub detected_at: DateTime<Local>,
}

pub type DetectCallback = Box<dyn FnMut(ScanResult) + Send>;

/// A running scan. Dropping it stops the worker and releases the camera.
#[derive(Debug)]
pub struct ScannerHandle {
    stop_tx: Option<flume::Sender<()>>,
    worker: Option<JoinHandle<Result<(), CameraError>>>,
}

impl ScannerHandle {
    /// Whether the worker has ended, either after `stop` or because the stream failed.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn shutdown(&mut self) -> Result<(), CameraError> {
        // Disconnecting the channel wakes the worker
        self.stop_tx.take();
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_panic| {
                Err(CameraError::Device("scanner worker panicked".to_owned()))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::debug!("Scanner ended with {e}");
        }
    }
}

pub trait DecodingGateway: Send + Sync {
    fn start_scanning(
        &self,
        camera: Box<dyn Camera>,
        lease: CameraLease,
        config: &ScanConfig,
        on_detect: DetectCallback,
    ) -> Result<ScannerHandle, CameraError>;

    /// Stops the scan and waits until the camera is released. Returns the error that ended
    /// the stream, if it ended on its own.
    fn stop(&self, mut handle: ScannerHandle) -> Result<(), CameraError> {
        handle.shutdown()
    }
}

/// Polls the camera at the configured rate on a worker thread.
#[derive(Clone)]
pub struct FrameLoopGateway {
    decoder: Arc<dyn FrameDecoder>,
}

impl std::fmt::Debug for FrameLoopGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoopGateway").finish_non_exhaustive()
    }
}

impl Default for FrameLoopGateway {
    fn default() -> Self {
        Self::new(Arc::new(RqrrDecoder))
    }
}

impl FrameLoopGateway {
    pub fn new(decoder: Arc<dyn FrameDecoder>) -> Self {
        Self { decoder }
    }
}

impl DecodingGateway for FrameLoopGateway {
    fn start_scanning(
        &self,
        mut camera: Box<dyn Camera>,
        lease: CameraLease,
        config: &ScanConfig,
        mut on_detect: DetectCallback,
    ) -> Result<ScannerHandle, CameraError> {
        let (stop_tx, stop_rx) = flume::bounded::<()>(1);
        let decoder = Arc::clone(&self.decoder);
        let interval = Duration::from_secs(1) / config.fps.max(1);
        let detection_box = config.detection_box;

        let worker = thread::Builder::new()
            .name("qr-scanner".to_owned())
            .spawn(move || {
                let result = scan_frames(
                    camera.as_mut(),
                    decoder.as_ref(),
                    detection_box,
                    interval,
                    &stop_rx,
                    &mut on_detect,
                );
                // Close the device before the slot reads as free.
                drop(camera);
                drop(lease);
                result
            })
            .map_err(|e| CameraError::Init(e.to_string()))?;

        Ok(ScannerHandle {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

/// Runs until stopped or until the camera fails. Consecutive identical decodes fire once.
fn scan_frames(
    camera: &mut dyn Camera,
    decoder: &dyn FrameDecoder,
    detection_box: Option<u32>,
    interval: Duration,
    stop_rx: &flume::Receiver<()>,
    on_detect: &mut DetectCallback,
) -> Result<(), CameraError> {
    let mut last_seen: Option<String> = None;
    loop {
        match camera.next_frame() {
            Ok(Some(frame)) => {
                let frame = match detection_box {
                    Some(size) => frame.crop_center(size),
                    None => frame,
                };
                match decoder.decode(&frame) {
                    Some(text) if last_seen.as_deref() != Some(text.as_str()) => {
                        log::debug!("Detected QR code ({} bytes)", text.len());
                        last_seen = Some(text.clone());
                        on_detect(ScanResult {
                            text,
                            detected_at: Local::now(),
                        });
                    }
                    Some(_) => {}
                    None => last_seen = None,
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Camera stream ended: {e}");
                return Err(e);
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(flume::RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{EncodeOptions, render};

    fn frame_of(payload: &str) -> GrayFrame {
        let image = render(payload, &EncodeOptions::default()).unwrap();
        GrayFrame::from_luma(image::DynamicImage::ImageRgba8(image.pixels().clone()).to_luma8())
    }

    #[test]
    fn rqrr_reads_generated_codes() {
        let frame = frame_of("https://example.com/scan");

        assert_eq!(
            RqrrDecoder.decode(&frame).as_deref(),
            Some("https://example.com/scan")
        );
    }

    #[test]
    fn blank_frame_decodes_to_nothing() {
        let frame = GrayFrame::new(64, 64, vec![255; 64 * 64]).unwrap();

        assert_eq!(RqrrDecoder.decode(&frame), None);
    }

    #[test]
    fn frame_dimensions_must_match() {
        assert!(GrayFrame::new(2, 2, vec![0; 3]).is_none());
    }

    #[test]
    fn crop_center_takes_the_middle() {
        let pixels = (0..16).collect();
        let frame = GrayFrame::new(4, 4, pixels).unwrap();

        let cropped = frame.crop_center(2);
        assert_eq!(cropped.pixels, vec![5, 6, 9, 10]);
        assert_eq!(frame.crop_center(100).width(), 4);
    }

    #[test]
    fn lease_is_exclusive_until_dropped() {
        let slot = CameraSlot::default();

        let lease = slot.acquire().unwrap();
        assert_eq!(slot.acquire().unwrap_err(), CameraError::Busy);
        drop(lease);
        assert!(slot.acquire().is_ok());
    }

    struct FailingCamera {
        closed: Arc<AtomicBool>,
    }

    impl Camera for FailingCamera {
        fn next_frame(&mut self) -> Result<Option<GrayFrame>, CameraError> {
            Err(CameraError::Device("unplugged".to_owned()))
        }
    }

    impl Drop for FailingCamera {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::Release);
        }
    }

    #[test]
    fn failed_stream_closes_the_camera_before_freeing_the_slot() {
        let slot = CameraSlot::default();
        let closed = Arc::new(AtomicBool::new(false));
        let camera = Box::new(FailingCamera {
            closed: Arc::clone(&closed),
        });
        let gateway = FrameLoopGateway::new(Arc::new(RqrrDecoder));

        let handle = gateway
            .start_scanning(
                camera,
                slot.acquire().unwrap(),
                &ScanConfig::default(),
                Box::new(|_: ScanResult| {}),
            )
            .unwrap();
        for _ in 0..500 {
            if !slot.is_busy() {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }

        assert!(!slot.is_busy(), "worker should release the slot after the stream fails");
        assert!(closed.load(Ordering::Acquire), "camera must be closed once the slot is free");
        assert_eq!(
            gateway.stop(handle),
            Err(CameraError::Device("unplugged".to_owned()))
        );
    }

    #[test]
    fn access_errors_share_the_permission_message() {
        assert_eq!(CameraError::PermissionDenied.user_message(), CAMERA_ACCESS_MESSAGE);
        assert_eq!(
            CameraError::NotFound("none".to_owned()).user_message(),
            CAMERA_ACCESS_MESSAGE
        );
        assert_eq!(CameraError::Busy.user_message(), "Camera is already in use");
    }
}
