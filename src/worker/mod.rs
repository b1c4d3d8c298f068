//! Background execution of store requests.
//!
//! Requests run off the UI thread and report back through one channel that
//! the event loop drains between frames, so the item list and the draft are
//! only ever touched by `update`.
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::document::Document;
use crate::editor::Submission;
use crate::store::{ContentApi, DocumentStore, Loaded, StoreError};

/// Store shared with worker threads.
pub type SharedStore = Arc<DocumentStore<Arc<dyn ContentApi>>>;

/// How requests are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One short-lived thread per request.
    Threaded,
    /// Run on the calling thread; the completion is still queued.
    Inline,
}

/// Result of one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Loaded(Loaded),
    Submitted(Result<(), StoreError>),
}

/// A finished request, tagged with the sequence number it was issued with.
#[derive(Debug, Clone)]
pub struct Completion {
    pub seq: u64,
    pub outcome: Outcome,
}

pub struct StoreWorker {
    store: SharedStore,
    mode: Mode,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl StoreWorker {
    pub fn new(store: SharedStore, mode: Mode) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            mode,
            tx,
            rx,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Start loading the document.
    pub fn load(&self, seq: u64) {
        debug!(seq, "load requested");
        self.spawn(
            seq,
            |store| Outcome::Loaded(store.load()),
            |err| {
                Outcome::Loaded(Loaded {
                    document: Document::empty(),
                    failure: Some(err),
                })
            },
        );
    }

    /// Start a read-modify-write with `submission`.
    pub fn submit(&self, seq: u64, submission: Submission) {
        debug!(seq, title = submission.title(), "submit requested");
        self.spawn(
            seq,
            move |store| {
                let message = submission.commit_message();
                Outcome::Submitted(store.save(|current| submission.apply(current), &message))
            },
            |err| Outcome::Submitted(Err(err)),
        );
    }

    /// Collect every completion that is ready, without blocking.
    pub fn drain(&self) -> Vec<Completion> {
        let mut ready = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            ready.push(completion);
        }
        ready
    }

    /// Wait up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Run `job`, reporting through `failed` if no thread could be started.
    fn spawn<F>(&self, seq: u64, job: F, failed: fn(StoreError) -> Outcome)
    where
        F: FnOnce(&DocumentStore<Arc<dyn ContentApi>>) -> Outcome + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let run = move || {
            let outcome = job(&store);
            if tx.send(Completion { seq, outcome }).is_err() {
                debug!(seq, "completion dropped, receiver gone");
            }
        };
        match self.mode {
            Mode::Inline => run(),
            Mode::Threaded => {
                let spawned = thread::Builder::new()
                    .name(format!("dropboard-req-{seq}"))
                    .spawn(run);
                if let Err(err) = spawned {
                    warn!(seq, error = %err, "failed to spawn request thread");
                    let outcome = failed(StoreError::Network(format!(
                        "failed to start request: {err}"
                    )));
                    let _ = self.tx.send(Completion { seq, outcome });
                }
            }
        }
    }
}

impl std::fmt::Debug for StoreWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreWorker")
            .field("remote", &self.store.api().describe())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
