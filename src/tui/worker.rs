//! Background workers for the TUI.
//!
//! Both the predictor boot and each scoring run happen off the UI thread so
//! the simulated delays never freeze the main loop. Results come back over an
//! mpsc channel that the app polls once per frame.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::adapters::PredictorHandle;
use crate::application::{ScoringOutcome, ScoringService};
use crate::config::AppConfig;
use crate::domain::ScoringInput;

/// What polling a worker yielded.
#[derive(Debug)]
pub enum Poll<T> {
    /// Still running
    Pending,
    Ready(T),
    /// The worker ended without sending (it panicked)
    Lost,
}

/// Handle to a running background task producing one `T`.
pub struct WorkerHandle<T> {
    rx: Receiver<T>,
    _handle: JoinHandle<()>,
}

impl<T> WorkerHandle<T> {
    /// Non-blocking check for the result.
    #[must_use]
    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(v) => Poll::Ready(v),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Lost,
        }
    }
}

fn spawn_task<T, F>(name: &str, task: F) -> std::io::Result<WorkerHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _ = tx.send(task());
        })?;
    Ok(WorkerHandle {
        rx,
        _handle: handle,
    })
}

/// Loads the predictor after the configured boot delay.
pub struct BootWorker;

impl BootWorker {
    /// # Errors
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(config: AppConfig) -> std::io::Result<WorkerHandle<Arc<ScoringService>>> {
        spawn_task("vitalia-boot", move || {
            thread::sleep(config.boot_delay);
            let handle = PredictorHandle::load(&config);
            Arc::new(ScoringService::new(Box::new(handle)))
        })
    }
}

/// Runs one scoring request after the simulated processing delay.
pub struct ScoringWorker;

impl ScoringWorker {
    /// # Errors
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(
        service: Arc<ScoringService>,
        input: ScoringInput,
        delay: Duration,
    ) -> std::io::Result<WorkerHandle<ScoringOutcome>> {
        spawn_task("vitalia-scoring", move || {
            thread::sleep(delay);
            service.score(&input)
        })
    }
}
