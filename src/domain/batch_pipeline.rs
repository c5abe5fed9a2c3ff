//! Bounded worker pool for applying an operation to items in batches.
//!
//! # Stages
//!
//! 1. **Source** streams the input onto a capacity-1 channel.
//! 2. **Workers** (a fixed number) pull items, accumulate them into batches and
//!    flush a batch when it is full, when the flush ticker fires, or when the
//!    source is drained. Each flush reports a [`BatchOutcome`] on the worker's
//!    own channel.
//! 3. **Sink** fans the worker channels into one channel that closes once every
//!    forwarder has finished.
//!
//! The orchestrating [`BatchPipeline::run`] call owns the sending half of a
//! `watch` channel. It is dropped when `run` returns or when the `run` future
//! itself is dropped, which closes the channel exactly once and stops every
//! stage at its next `select!`. Batches that were already flushed are not
//! rolled back.
//!
//! Batches are committed independently and in no particular order; there is
//! no all-or-nothing guarantee across a run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Worker pool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub workers: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl PipelineConfig {
    /// Clamps zero values, which would otherwise stall the pool or panic the
    /// ticker.
    fn normalized(self) -> Self {
        Self {
            workers: self.workers.max(1),
            batch_size: self.batch_size.max(1),
            flush_interval: if self.flush_interval.is_zero() {
                DEFAULT_FLUSH_INTERVAL
            } else {
                self.flush_interval
            },
        }
    }
}

/// Result of one flushed batch.
#[derive(Debug)]
pub struct BatchOutcome<E> {
    pub items: usize,
    pub result: Result<(), E>,
}

/// Aggregated results of a pipeline run.
#[derive(Debug)]
pub struct PipelineReport<E> {
    /// Number of batches flushed.
    pub batches: usize,
    /// Number of items handed to the operation, failed batches included.
    pub items: usize,
    /// Number of items that belonged to failed batches.
    pub failed_items: usize,
    pub failures: Vec<E>,
}

impl<E> Default for PipelineReport<E> {
    fn default() -> Self {
        Self {
            batches: 0,
            items: 0,
            failed_items: 0,
            failures: Vec::new(),
        }
    }
}

impl<E> PipelineReport<E> {
    /// Returns true when every flushed batch succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: BatchOutcome<E>) {
        self.batches += 1;
        self.items += outcome.items;
        if let Err(e) = outcome.result {
            self.failed_items += outcome.items;
            self.failures.push(e);
        }
    }
}

/// Fan-out/fan-in worker pool, independent of the operation it carries.
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    config: PipelineConfig,
}

impl Default for BatchPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl BatchPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Runs `op` over `items` in batches and waits for every worker to finish.
    ///
    /// A failing batch does not stop the others; it is recorded in the
    /// returned report.
    pub async fn run<T, E, F, Fut>(&self, items: Vec<T>, op: F) -> PipelineReport<E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let mut report = PipelineReport::default();
        if items.is_empty() {
            return report;
        }

        let (done_tx, done_rx) = watch::channel(());
        // Dropped on return or cancellation; closes the done channel.
        let _done = done_tx;

        let input = source(done_rx.clone(), items);
        let op = Arc::new(op);

        let channels = (0..self.config.workers)
            .map(|_| {
                spawn_worker(
                    done_rx.clone(),
                    input.clone(),
                    op.clone(),
                    self.config.batch_size,
                    self.config.flush_interval,
                )
            })
            .collect();

        let mut merged = fan_in(done_rx, channels);
        while let Some(outcome) = merged.recv().await {
            report.record(outcome);
        }

        report
    }
}

fn source<T>(mut done: watch::Receiver<()>, items: Vec<T>) -> SharedReceiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        for item in items {
            tokio::select! {
                biased;
                _ = done.changed() => return,
                sent = tx.send(item) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    });

    Arc::new(Mutex::new(rx))
}

fn spawn_worker<T, E, F, Fut>(
    mut done: watch::Receiver<()>,
    input: SharedReceiver<T>,
    op: Arc<F>,
    batch_size: usize,
    flush_interval: Duration,
) -> mpsc::Receiver<BatchOutcome<E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut batch = Vec::with_capacity(batch_size);
        let mut ticker = time::interval(flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = done.changed() => return,
                next = recv_shared(&input) => match next {
                    Some(item) => {
                        batch.push(item);
                        if batch.len() >= batch_size && !flush(&mut batch, op.as_ref(), &tx).await {
                            return;
                        }
                    }
                    None => {
                        flush(&mut batch, op.as_ref(), &tx).await;
                        return;
                    }
                },
                _ = ticker.tick() => {
                    if !flush(&mut batch, op.as_ref(), &tx).await {
                        return;
                    }
                }
            }
        }
    });

    rx
}

async fn recv_shared<T>(input: &SharedReceiver<T>) -> Option<T> {
    input.lock().await.recv().await
}

/// Applies `op` to the pending batch. Returns false once nobody is listening
/// for outcomes any more.
async fn flush<T, E, F, Fut>(
    batch: &mut Vec<T>,
    op: &F,
    out: &mpsc::Sender<BatchOutcome<E>>,
) -> bool
where
    F: Fn(Vec<T>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    if batch.is_empty() {
        return true;
    }

    let items = std::mem::take(batch);
    let size = items.len();
    let result = op(items).await;

    out.send(BatchOutcome {
        items: size,
        result,
    })
    .await
    .is_ok()
}

fn fan_in<E>(
    done: watch::Receiver<()>,
    channels: Vec<mpsc::Receiver<BatchOutcome<E>>>,
) -> mpsc::Receiver<BatchOutcome<E>>
where
    E: Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let mut forwarders = JoinSet::new();

    for mut channel in channels {
        let tx = tx.clone();
        let mut done = done.clone();
        forwarders.spawn(async move {
            while let Some(outcome) = channel.recv().await {
                tokio::select! {
                    biased;
                    _ = done.changed() => return,
                    sent = tx.send(outcome) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        });
    }

    // Wait group: the merged channel closes when the last sender is gone.
    tokio::spawn(async move {
        while forwarders.join_next().await.is_some() {}
        drop(tx);
    });

    rx
}
