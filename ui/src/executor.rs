//! Runs generation requests off the UI thread and hands outcomes back once per frame.
//!
//! Sessions only describe work ([`PendingGeneration`], [`PendingGrid`], [`PendingBatch`]).
//! The executor spawns that work on a Tokio runtime and sends every outcome over a `flume`
//! channel. [`Executor::drain`] is called from `update`, so all session state is still
//! mutated on the UI thread.

use std::sync::Arc;

use qrkit_business::{
    EncodingGateway,
    batch::{BatchEvent, PendingBatch, run_batch},
    generation::{Completion, PendingGeneration, execute},
    preview::{GridCompletion, PendingGrid, render_grid},
};
use tokio::runtime::Handle;

/// Which session a generation completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Simple,
    Formats,
    Preview,
    Logo,
}

#[derive(Debug)]
pub enum Outcome {
    Generation(Target, Completion),
    Grid(GridCompletion),
    Batch(BatchEvent),
}

pub struct Executor {
    runtime: Handle,
    gateway: Arc<dyn EncodingGateway>,
    tx: flume::Sender<Outcome>,
    rx: flume::Receiver<Outcome>,
    repaint: Option<egui::Context>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("queued", &self.rx.len())
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(runtime: Handle, gateway: Arc<dyn EncodingGateway>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            runtime,
            gateway,
            tx,
            rx,
            repaint: None,
        }
    }

    /// Lets finished jobs wake the UI instead of waiting for the next input event.
    pub fn attach(&mut self, ctx: &egui::Context) {
        if self.repaint.is_none() {
            self.repaint = Some(ctx.clone());
        }
    }

    pub fn spawn_generation(&self, target: Target, pending: PendingGeneration) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            let completion = execute(gateway.as_ref(), pending).await;
            deliver(&tx, repaint.as_ref(), Outcome::Generation(target, completion));
        });
    }

    pub fn spawn_grid(&self, pending: PendingGrid) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            let completion = render_grid(gateway.as_ref(), pending).await;
            deliver(&tx, repaint.as_ref(), Outcome::Grid(completion));
        });
    }

    pub fn spawn_batch(&self, pending: PendingBatch) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            run_batch(gateway.as_ref(), pending, |event| {
                deliver(&tx, repaint.as_ref(), Outcome::Batch(event));
            })
            .await;
        });
    }

    /// Everything that finished since the last call, in completion order.
    pub fn drain(&self) -> Vec<Outcome> {
        self.rx.try_iter().collect()
    }
}

fn deliver(tx: &flume::Sender<Outcome>, repaint: Option<&egui::Context>, outcome: Outcome) {
    if tx.send(outcome).is_err() {
        log::debug!("UI closed before a job finished");
        return;
    }
    if let Some(ctx) = repaint {
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrkit_business::{
        EncodeOptions, encoding::QrcodeGateway, generation::GenerationMode,
        generation::GenerationSession,
    };
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_completion_is_routed_to_its_target() {
        let executor = Executor::new(Handle::current(), Arc::new(QrcodeGateway));
        let mut session = GenerationSession::new(
            GenerationMode::Simple,
            EncodeOptions::default(),
            Duration::ZERO,
        );
        session.set_input("routed");
        executor.spawn_generation(Target::Simple, session.generate().unwrap());

        let mut outcomes = Vec::new();
        for _ in 0..200 {
            outcomes = executor.drain();
            if !outcomes.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(matches!(
            outcomes.as_slice(),
            [Outcome::Generation(Target::Simple, completion)] if completion.payload == "routed"
        ));
    }
}
