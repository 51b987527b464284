//! Generation sessions: one input, one current artifact.
//!
//! A session never awaits anything itself. Issuing a request returns a
//! [`PendingGeneration`] that the caller hands to [`execute`] on whatever executor it owns;
//! the resulting [`Completion`] goes back through [`GenerationSession::apply`], which only
//! accepts the completion of the most recently issued request.
//!
//! ```text
//! Idle ──generate/submit──▶ Pending ──apply──▶ Ready | Failed
//!   ▲                          ▲                    │
//!   └──── empty input ─────────┴──── option change ─┘
//! ```

use std::time::{Duration, Instant};

use qrkit_states::{RequestTracker, TaskHandle, TaskId};

use crate::{
    color::QrColor,
    encoding::{EncodeOptions, EncodingError, EncodingGateway, ErrorCorrection, QrImage},
    error::ValidationError,
    history::HistoryManager,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Which tab or advanced sub-mode a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    Simple,
    Formats,
    Preview,
    Logo,
}

impl GenerationMode {
    /// Whether successful generations are appended to history.
    pub fn records_history(self) -> bool {
        !matches!(self, Self::Logo)
    }

    fn scope(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Formats => "formats",
            Self::Preview => "preview",
            Self::Logo => "logo",
        }
    }

    fn empty_input(self) -> ValidationError {
        let message = match self {
            Self::Simple | Self::Formats => "Please enter text or a URL to generate a QR code.",
            Self::Preview => "Please enter text or a URL.",
            Self::Logo => "Please enter text or URL",
        };
        ValidationError::new("input", message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationState {
    #[default]
    Idle,
    Pending,
    Ready(QrImage),
    Failed(EncodingError),
}

/// A request the session has issued and is waiting on.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub handle: TaskHandle,
    pub payload: String,
    pub options: EncodeOptions,
}

/// Outcome of a [`PendingGeneration`], tagged with the request that produced it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: TaskId,
    pub payload: String,
    pub result: Result<QrImage, EncodingError>,
}

/// Runs one generation request to completion.
///
/// A request that was already superseded before it started is not sent to the gateway.
pub async fn execute(gateway: &dyn EncodingGateway, pending: PendingGeneration) -> Completion {
    let PendingGeneration {
        handle,
        payload,
        options,
    } = pending;

    let result = if handle.is_cancelled() {
        Err(EncodingError::Interrupted("superseded".to_owned()))
    } else {
        gateway.generate(payload.clone(), options).await
    };

    Completion {
        id: handle.id(),
        payload,
        result,
    }
}

#[derive(Debug)]
pub struct GenerationSession {
    mode: GenerationMode,
    input: String,
    payload: Option<String>,
    options: EncodeOptions,
    state: GenerationState,
    validation: Option<ValidationError>,
    tracker: RequestTracker,
    debounce: Duration,
    regenerate_at: Option<Instant>,
}

impl GenerationSession {
    pub fn new(mode: GenerationMode, options: EncodeOptions, debounce: Duration) -> Self {
        Self {
            mode,
            input: String::new(),
            payload: None,
            options: EncodeOptions {
                width: EncodeOptions::clamp_width(options.width),
                ..options
            },
            state: GenerationState::Idle,
            validation: None,
            tracker: RequestTracker::new(mode.scope()),
            debounce,
            regenerate_at: None,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Raw, untrimmed text as typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// The payload of the current (or last) request.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn image(&self) -> Option<&QrImage> {
        match &self.state {
            GenerationState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn encoding_error(&self) -> Option<&EncodingError> {
        match &self.state {
            GenerationState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, GenerationState::Pending)
    }

    /// Explicit "Generate": uses the trimmed input as payload.
    pub fn generate(&mut self) -> Result<PendingGeneration, ValidationError> {
        let trimmed = self.input.trim().to_owned();
        self.submit(trimmed)
    }

    /// Issues a request for an already built payload.
    pub fn submit(&mut self, payload: String) -> Result<PendingGeneration, ValidationError> {
        if payload.trim().is_empty() {
            let error = self.mode.empty_input();
            self.reset_to_idle();
            self.validation = Some(error);
            return Err(error);
        }

        self.validation = None;
        self.payload = Some(payload);
        Ok(self.issue())
    }

    /// Shows a validation failure raised outside the session, leaving it idle.
    pub fn reject(&mut self, error: ValidationError) {
        self.reset_to_idle();
        self.validation = Some(error);
    }

    pub fn set_width(&mut self, width: u32) {
        let width = EncodeOptions::clamp_width(width);
        if width != self.options.width {
            self.options.width = width;
            self.options_changed();
        }
    }

    pub fn set_dark(&mut self, dark: QrColor) {
        if dark != self.options.dark {
            self.options.dark = dark;
            self.options_changed();
        }
    }

    pub fn set_light(&mut self, light: QrColor) {
        if light != self.options.light {
            self.options.light = light;
            self.options_changed();
        }
    }

    pub fn set_error_correction(&mut self, level: ErrorCorrection) {
        if level != self.options.error_correction {
            self.options.error_correction = level;
            self.options_changed();
        }
    }

    /// Issues the regeneration scheduled by an option change once the quiet period is over.
    pub fn poll_debounced(&mut self, now: Instant) -> Option<PendingGeneration> {
        let due = self.regenerate_at?;
        if now < due {
            return None;
        }
        if self.payload.is_none() {
            self.regenerate_at = None;
            return None;
        }
        Some(self.issue())
    }

    /// When the next debounced regeneration is due, for repaint scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.regenerate_at
    }

    /// Applies a completion. Returns `false` (and changes nothing) if it is stale.
    pub fn apply(&mut self, completion: Completion, history: &mut HistoryManager) -> bool {
        if !self.tracker.finish(completion.id) {
            log::debug!("Discarding stale completion {}", completion.id);
            return false;
        }

        match completion.result {
            Ok(image) => {
                log::info!(
                    "Generated {}px QR code ({})",
                    image.width(),
                    completion.id
                );
                if self.mode.records_history() {
                    history.add_to_history(&completion.payload);
                }
                self.state = GenerationState::Ready(image);
            }
            Err(error) => {
                log::warn!("QR generation failed ({}): {error}", completion.id);
                self.state = GenerationState::Failed(error);
            }
        }
        true
    }

    /// Forgets input, payload and result.
    pub fn clear(&mut self) {
        self.input.clear();
        self.reset_to_idle();
        self.validation = None;
    }

    fn issue(&mut self) -> PendingGeneration {
        self.regenerate_at = None;
        let handle = self.tracker.begin();
        self.state = GenerationState::Pending;
        PendingGeneration {
            handle,
            payload: self.payload.clone().unwrap_or_default(),
            options: self.options,
        }
    }

    fn options_changed(&mut self) {
        if self.payload.is_none() {
            return;
        }
        self.tracker.invalidate();
        self.state = GenerationState::Pending;
        self.regenerate_at = Some(Instant::now() + self.debounce);
    }

    fn reset_to_idle(&mut self) {
        self.tracker.invalidate();
        self.payload = None;
        self.regenerate_at = None;
        self.state = GenerationState::Idle;
    }
}
