//! Advanced → multi-size preview.

use std::time::{Duration, Instant};

use qrkit_states::{RequestTracker, TaskHandle, TaskId};

use crate::{
    encoding::{EncodeOptions, EncodingGateway, QrImage},
    error::ValidationError,
    generation::{GenerationMode, GenerationSession, PendingGeneration},
};

pub const DEFAULT_PREVIEW_SIZES: [u32; 4] = [200, 300, 400, 600];

/// Grid request issued next to every main preview request.
#[derive(Debug, Clone)]
pub struct PendingGrid {
    pub handle: TaskHandle,
    pub payload: String,
    pub options: EncodeOptions,
    pub sizes: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct GridCompletion {
    pub id: TaskId,
    pub images: Vec<(u32, QrImage)>,
}

/// Renders every grid size in order. Sizes that fail are skipped.
pub async fn render_grid(gateway: &dyn EncodingGateway, pending: PendingGrid) -> GridCompletion {
    let mut images = Vec::with_capacity(pending.sizes.len());
    for size in pending.sizes {
        if pending.handle.is_cancelled() {
            log::debug!("Preview grid {} superseded", pending.handle.id());
            break;
        }
        let options = EncodeOptions {
            width: size,
            ..pending.options
        };
        match gateway.generate(pending.payload.clone(), options).await {
            Ok(image) => images.push((size, image)),
            Err(e) => log::warn!("Failed to generate preview for size {size}: {e}"),
        }
    }
    GridCompletion {
        id: pending.handle.id(),
        images,
    }
}

/// A preview-mode [`GenerationSession`] plus the same code at several sizes.
#[derive(Debug)]
pub struct MultiSizePreview {
    pub session: GenerationSession,
    sizes: Vec<u32>,
    grid_tracker: RequestTracker,
    grid: Vec<(u32, QrImage)>,
}

impl MultiSizePreview {
    pub fn new(options: EncodeOptions, debounce: Duration, sizes: Vec<u32>) -> Self {
        Self {
            session: GenerationSession::new(GenerationMode::Preview, options, debounce),
            sizes: sizes
                .into_iter()
                .map(EncodeOptions::clamp_width)
                .collect(),
            grid_tracker: RequestTracker::new("preview-grid"),
            grid: Vec::new(),
        }
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn grid(&self) -> &[(u32, QrImage)] {
        &self.grid
    }

    pub fn generate(&mut self) -> Result<(PendingGeneration, PendingGrid), ValidationError> {
        match self.session.generate() {
            Ok(pending) => {
                let grid = self.issue_grid(&pending);
                Ok((pending, grid))
            }
            Err(e) => {
                self.grid_tracker.invalidate();
                self.grid.clear();
                Err(e)
            }
        }
    }

    pub fn poll_debounced(&mut self, now: Instant) -> Option<(PendingGeneration, PendingGrid)> {
        let pending = self.session.poll_debounced(now)?;
        let grid = self.issue_grid(&pending);
        Some((pending, grid))
    }

    pub fn apply_grid(&mut self, completion: GridCompletion) -> bool {
        if !self.grid_tracker.finish(completion.id) {
            log::debug!("Discarding stale preview grid {}", completion.id);
            return false;
        }
        self.grid = completion.images;
        true
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.grid_tracker.invalidate();
        self.grid.clear();
    }

    fn issue_grid(&mut self, pending: &PendingGeneration) -> PendingGrid {
        PendingGrid {
            handle: self.grid_tracker.begin(),
            payload: pending.payload.clone(),
            options: pending.options,
            sizes: self.sizes.clone(),
        }
    }
}
