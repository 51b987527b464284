//! Racing completions against the "latest request wins" guard.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use qrkit_business::{
    EncodeOptions, EncodingError, EncodingGateway, HistoryManager, PersistentStore, QrImage,
    encoding::render,
    generation::{Completion, GenerationMode, GenerationSession, PendingGeneration, execute},
};

/// Renders for real, but only after a per-payload delay.
struct DelayedGateway {
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl DelayedGateway {
    fn new<'a>(delays: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self {
            delays: delays
                .into_iter()
                .map(|(payload, ms)| (payload.to_owned(), Duration::from_millis(ms)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EncodingGateway for DelayedGateway {
    async fn generate(
        &self,
        payload: String,
        options: EncodeOptions,
    ) -> Result<QrImage, EncodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(&payload).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        render(&payload, &options)
    }
}

fn spawn_execute(
    gateway: &Arc<DelayedGateway>,
    pending: PendingGeneration,
    tx: &flume::Sender<Completion>,
) {
    let gateway = Arc::clone(gateway);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = execute(gateway.as_ref(), pending).await;
        tx.send(completion).unwrap();
    });
}

fn history() -> HistoryManager {
    let _ = env_logger::builder().is_test(true).try_init();
    HistoryManager::load(PersistentStore::in_memory(), 50)
}

#[tokio::test(start_paused = true)]
async fn test_slow_first_request_never_overwrites_fast_second() {
    let gateway = Arc::new(DelayedGateway::new([("slow", 500), ("fast", 10)]));
    let mut session =
        GenerationSession::new(GenerationMode::Simple, EncodeOptions::default(), Duration::ZERO);
    let mut history = history();
    let (tx, rx) = flume::unbounded();

    session.set_input("slow");
    spawn_execute(&gateway, session.generate().unwrap(), &tx);
    // Let the slow request reach the gateway before it is superseded
    tokio::task::yield_now().await;

    session.set_input("fast");
    spawn_execute(&gateway, session.generate().unwrap(), &tx);
    drop(tx);

    let mut outcomes = Vec::new();
    while let Ok(completion) = rx.recv_async().await {
        let payload = completion.payload.clone();
        outcomes.push((payload, session.apply(completion, &mut history)));
    }

    assert_eq!(
        outcomes,
        vec![("fast".to_owned(), true), ("slow".to_owned(), false)]
    );
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        session.image(),
        Some(&render("fast", &EncodeOptions::default()).unwrap())
    );
    let recorded: Vec<_> = history.history().iter().map(|e| e.data.as_str()).collect();
    assert_eq!(recorded, vec!["fast"]);
}

#[tokio::test(start_paused = true)]
async fn test_option_change_discards_in_flight_result() {
    let gateway = Arc::new(DelayedGateway::new([("abc", 100)]));
    let mut session =
        GenerationSession::new(GenerationMode::Simple, EncodeOptions::default(), Duration::ZERO);
    let mut history = history();
    let (tx, rx) = flume::unbounded();

    session.set_input("abc");
    spawn_execute(&gateway, session.generate().unwrap(), &tx);
    tokio::task::yield_now().await;

    session.set_width(250);
    let completion = rx.recv_async().await.unwrap();
    assert!(!session.apply(completion, &mut history));
    assert!(session.is_pending());

    let pending = session
        .poll_debounced(std::time::Instant::now())
        .expect("debounced regeneration is due");
    spawn_execute(&gateway, pending, &tx);
    let completion = rx.recv_async().await.unwrap();

    assert!(session.apply(completion, &mut history));
    assert_eq!(session.image().map(QrImage::width), Some(250));
    assert_eq!(history.history().len(), 1);
}

#[tokio::test]
async fn test_superseded_request_skips_the_gateway() {
    let gateway = Arc::new(DelayedGateway::new([]));
    let mut session =
        GenerationSession::new(GenerationMode::Formats, EncodeOptions::default(), Duration::ZERO);

    let stale = session.submit("tel:123".to_owned()).unwrap();
    let _fresh = session.submit("tel:456".to_owned()).unwrap();
    let completion = execute(gateway.as_ref(), stale).await;

    assert!(matches!(completion.result, Err(EncodingError::Interrupted(_))));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_identical_inputs_render_identically() {
    let gateway = qrkit_business::encoding::QrcodeGateway;
    let options = EncodeOptions::default();

    let a = gateway
        .generate("determinism".to_owned(), options)
        .await
        .unwrap();
    let b = gateway
        .generate("determinism".to_owned(), options)
        .await
        .unwrap();

    assert_eq!(a.pixels().as_raw(), b.pixels().as_raw());
}
