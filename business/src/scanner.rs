//! Scanner tab session: camera lifecycle and the latest decoded result.

use std::sync::Arc;

use crate::decoding::{
    CameraError, CameraProvider, CameraSlot, DecodingGateway, ScanConfig, ScanResult,
    ScannerHandle,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScannerState {
    #[default]
    Stopped,
    Starting,
    Active,
}

pub struct ScannerSession {
    gateway: Arc<dyn DecodingGateway>,
    slot: CameraSlot,
    config: ScanConfig,
    state: ScannerState,
    handle: Option<ScannerHandle>,
    detections: Option<flume::Receiver<ScanResult>>,
    result: Option<ScanResult>,
    error: Option<CameraError>,
}

impl std::fmt::Debug for ScannerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerSession")
            .field("state", &self.state)
            .field("result", &self.result)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl ScannerSession {
    pub fn new(gateway: Arc<dyn DecodingGateway>, slot: CameraSlot, config: ScanConfig) -> Self {
        Self {
            gateway,
            slot,
            config,
            state: ScannerState::Stopped,
            handle: None,
            detections: None,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScannerState::Active
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    /// Opens a camera from `provider` and starts decoding. Any running scan is stopped
    /// first. On failure the session is back in `Stopped` with the error kept.
    pub fn start(&mut self, provider: &dyn CameraProvider) -> Result<(), CameraError> {
        self.stop();
        self.error = None;
        self.state = ScannerState::Starting;

        match self.open(provider) {
            Ok((handle, detections)) => {
                self.handle = Some(handle);
                self.detections = Some(detections);
                self.state = ScannerState::Active;
                log::info!("Scanner started");
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to start scanner: {e}");
                self.state = ScannerState::Stopped;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn open(
        &self,
        provider: &dyn CameraProvider,
    ) -> Result<(ScannerHandle, flume::Receiver<ScanResult>), CameraError> {
        let lease = self.slot.acquire()?;
        let camera = provider.open(self.config.facing)?;
        let (tx, rx) = flume::unbounded();
        let handle = self.gateway.start_scanning(
            camera,
            lease,
            &self.config,
            Box::new(move |result| {
                if tx.send(result).is_err() {
                    log::debug!("Scanner session is gone, dropping detection");
                }
            }),
        )?;
        Ok((handle, rx))
    }

    /// Takes in new detections. Returns whether the displayed result changed.
    ///
    /// Also notices a worker that ended on its own, which leaves the session `Stopped`
    /// with the stream error.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.drain();

        if self.handle.as_ref().is_some_and(ScannerHandle::is_finished) {
            changed |= self.drain();
            if let Some(handle) = self.handle.take() {
                if let Err(e) = self.gateway.stop(handle) {
                    log::warn!("Scanner stopped unexpectedly: {e}");
                    self.error = Some(e);
                }
            }
            self.detections = None;
            self.state = ScannerState::Stopped;
            changed = true;
        }
        changed
    }

    fn drain(&mut self) -> bool {
        let Some(detections) = &self.detections else {
            return false;
        };
        let mut changed = false;
        for detection in detections.try_iter() {
            if self.result.as_ref().is_some_and(|r| r.text == detection.text) {
                continue;
            }
            log::info!("Scanned {} bytes of text", detection.text.len());
            self.result = Some(detection);
            changed = true;
        }
        changed
    }

    /// Stops the camera and waits for it to be released. A no-op when already stopped.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            self.state = ScannerState::Stopped;
            return;
        };
        if let Err(e) = self.gateway.stop(handle) {
            log::debug!("Scanner had already failed: {e}");
        }
        self.drain();
        self.detections = None;
        self.state = ScannerState::Stopped;
        log::info!("Scanner stopped");
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }
}

impl Drop for ScannerSession {
    fn drop(&mut self) {
        self.stop();
    }
}
