// In-memory collaborators for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::backend::{Backend, InitialState};
use crate::error::CoreError;
use crate::feed::{FeedConnection, FeedHandlers, FeedTransport, SubscriptionKey};

// ── Feed transport ───────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FeedLog {
    live: AtomicUsize,
    max_live: AtomicUsize,
    closes: AtomicUsize,
    refuse: AtomicBool,
    opened: Mutex<Vec<SubscriptionKey>>,
    handlers: Mutex<Vec<FeedHandlers>>,
}

impl FeedLog {
    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn opened(&self) -> Vec<SubscriptionKey> {
        self.opened.lock().unwrap().clone()
    }

    /// Handlers given to the `n`th connection.
    pub(crate) fn handlers(&self, n: usize) -> FeedHandlers {
        self.handlers.lock().unwrap()[n].clone()
    }

    pub(crate) fn latest_handlers(&self) -> FeedHandlers {
        self.handlers.lock().unwrap().last().cloned().unwrap()
    }

    pub(crate) fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub(crate) log: Arc<FeedLog>,
}

impl FeedTransport for FakeTransport {
    type Connection = FakeConnection;

    fn connect(
        &self,
        key: &SubscriptionKey,
        handlers: FeedHandlers,
    ) -> Result<FakeConnection, CoreError> {
        if self.log.refuse.load(Ordering::SeqCst) {
            return Err(CoreError::Config {
                message: "refused".into(),
            });
        }

        let live = self.log.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_live.fetch_max(live, Ordering::SeqCst);
        self.log.opened.lock().unwrap().push(key.clone());
        self.log.handlers.lock().unwrap().push(handlers);

        Ok(FakeConnection {
            log: Arc::clone(&self.log),
            closed: false,
        })
    }
}

pub(crate) struct FakeConnection {
    log: Arc<FeedLog>,
    closed: bool,
}

impl FeedConnection for FakeConnection {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.live.fetch_sub(1, Ordering::SeqCst);
            self.log.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ── Backend ──────────────────────────────────────────────────────────

type Gate = oneshot::Receiver<Result<(), CoreError>>;

/// Backend whose initial state is fixed and whose namespace activations
/// complete only when the test releases them.
pub(crate) struct FakeBackend {
    initial: Result<InitialState, CoreError>,
    mount_gate: Mutex<Option<oneshot::Receiver<()>>>,
    gates: Mutex<HashMap<String, Gate>>,
    releases: Mutex<HashMap<String, oneshot::Sender<Result<(), CoreError>>>>,
}

impl FakeBackend {
    pub(crate) fn new(initial: Result<InitialState, CoreError>) -> Self {
        Self {
            initial,
            mount_gate: Mutex::new(None),
            gates: Mutex::new(HashMap::new()),
            releases: Mutex::new(HashMap::new()),
        }
    }

    /// Hold the initial load until the returned sender fires.
    pub(crate) fn hold_mount(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.mount_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Make activation of `namespace` wait for [`release`](Self::release).
    pub(crate) fn gate(&self, namespace: &str) {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(namespace.to_owned(), rx);
        self.releases.lock().unwrap().insert(namespace.to_owned(), tx);
    }

    pub(crate) fn release(&self, namespace: &str, result: Result<(), CoreError>) {
        let tx = self.releases.lock().unwrap().remove(namespace).unwrap();
        let _ = tx.send(result);
    }
}

impl Backend for FakeBackend {
    async fn initial_state(&self, _path: &str) -> Result<InitialState, CoreError> {
        let gate = self.mount_gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        self.initial.clone()
    }

    async fn activate_namespace(&self, namespace: &str) -> Result<(), CoreError> {
        let gate = self.gates.lock().unwrap().remove(namespace);
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(CoreError::ControllerStopped)),
            None => Ok(()),
        }
    }
}
