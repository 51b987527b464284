//! Advanced → batch generation, one code per input line.

use qrkit_states::{RequestTracker, TaskHandle, TaskId};

use crate::{
    encoding::{EncodeOptions, EncodingError, EncodingGateway, ErrorCorrection, QrImage},
    error::ValidationError,
    history::HistoryManager,
};

pub const DEFAULT_BATCH_WIDTH: u32 = 300;

const EMPTY_BATCH: ValidationError =
    ValidationError::new("batch", "Please enter data to batch generate.");

/// Splits batch input into payload lines.
///
/// Lines are split on `\n` with a trailing `\r` dropped. Blank lines are discarded; the
/// remaining lines keep their order and their original text.
pub fn parse_batch(input: &str) -> Result<Vec<String>, ValidationError> {
    let lines: Vec<String> = input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect();

    if lines.is_empty() {
        Err(EMPTY_BATCH)
    } else {
        Ok(lines)
    }
}

#[derive(Debug, Clone)]
pub struct PendingBatch {
    pub handle: TaskHandle,
    pub lines: Vec<String>,
    pub options: EncodeOptions,
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Item {
        id: TaskId,
        index: usize,
        text: String,
        result: Result<QrImage, EncodingError>,
    },
    Finished {
        id: TaskId,
    },
}

/// Generates every line strictly one after another, reporting each outcome to `sink`.
///
/// A failing line does not stop the batch. A superseded batch stops at the next line
/// boundary without emitting `Finished`.
pub async fn run_batch(
    gateway: &dyn EncodingGateway,
    pending: PendingBatch,
    mut sink: impl FnMut(BatchEvent),
) {
    let id = pending.handle.id();
    for (index, text) in pending.lines.into_iter().enumerate() {
        if pending.handle.is_cancelled() {
            log::debug!("Batch {id} superseded at line {index}");
            return;
        }
        let result = gateway.generate(text.clone(), pending.options).await;
        sink(BatchEvent::Item {
            id,
            index,
            text,
            result,
        });
    }
    sink(BatchEvent::Finished { id });
}

/// One successfully generated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Position of the line among the non-blank input lines.
    pub index: usize,
    pub text: String,
    pub image: QrImage,
}

#[derive(Debug)]
pub struct BatchSession {
    input: String,
    options: EncodeOptions,
    tracker: RequestTracker,
    items: Vec<BatchItem>,
    total: usize,
    processed: usize,
    failed: usize,
    running: bool,
    validation: Option<ValidationError>,
}

impl BatchSession {
    pub fn new(width: u32) -> Self {
        Self {
            input: String::new(),
            options: EncodeOptions::plain(EncodeOptions::clamp_width(width), ErrorCorrection::M),
            tracker: RequestTracker::new("batch"),
            items: Vec::new(),
            total: 0,
            processed: 0,
            failed: 0,
            running: false,
            validation: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Successful items in input order.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    /// Parses the input and issues a new batch, superseding any running one.
    pub fn start(&mut self) -> Result<PendingBatch, ValidationError> {
        let lines = match parse_batch(&self.input) {
            Ok(lines) => lines,
            Err(e) => {
                self.validation = Some(e);
                return Err(e);
            }
        };

        self.validation = None;
        self.items.clear();
        self.total = lines.len();
        self.processed = 0;
        self.failed = 0;
        self.running = true;
        log::info!("Starting batch of {} lines", lines.len());

        Ok(PendingBatch {
            handle: self.tracker.begin(),
            lines,
            options: self.options,
        })
    }

    /// Applies one batch event. Events of a superseded batch are ignored.
    pub fn apply(&mut self, event: BatchEvent, history: &mut HistoryManager) -> bool {
        match event {
            BatchEvent::Item {
                id,
                index,
                text,
                result,
            } => {
                if !self.tracker.is_current(id) {
                    log::debug!("Discarding stale batch item {id}/{index}");
                    return false;
                }
                self.processed += 1;
                match result {
                    Ok(image) => {
                        history.add_to_history(&text);
                        self.items.push(BatchItem { index, text, image });
                    }
                    Err(e) => {
                        log::warn!("Batch line {} failed: {e}", index + 1);
                        self.failed += 1;
                    }
                }
                true
            }
            BatchEvent::Finished { id } => {
                if !self.tracker.finish(id) {
                    return false;
                }
                self.running = false;
                log::info!(
                    "Batch finished: {} generated, {} failed",
                    self.items.len(),
                    self.failed
                );
                true
            }
        }
    }
}
