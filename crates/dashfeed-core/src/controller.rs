// ── Synchronization controller ──
//
// Keeps the content feed aligned with the displayed path and namespace.
// All state lives in one actor task. Host commands, feed signals and the
// results of background requests arrive as messages and are handled one at
// a time, so no two mutations ever interleave. The host only sees
// immutable `ViewSnapshot`s through a watch channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{Backend, HttpBackend, InitialState};
use crate::config::ControllerConfig;
use crate::convert::decode_navigation;
use crate::error::CoreError;
use crate::feed::{
    FeedEvent, FeedSignal, FeedSubscriptionManager, FeedTransport, HttpFeedTransport,
    SubscriptionKey,
};
use crate::model::{
    ContentDocument, DEFAULT_NAMESPACE, NamespaceOption, NavigationSection, NavigationTree,
    content, resolve_route,
};
use crate::namespace::{NamespaceSwitchCoordinator, SwitchOutcome, SwitchTicket};

const COMMAND_CHANNEL_SIZE: usize = 64;

/// Notice shown while the feed is reconnecting.
pub const FEED_GONE_MESSAGE: &str = "Looks like the back end source has gone away. Retrying...";

/// Notice shown by [`SyncController::set_error`] when no message is given.
pub const DEFAULT_ERROR_MESSAGE: &str = "Oops, something is not right, try again.";

// ── ViewSnapshot ─────────────────────────────────────────────────────

/// Everything a view needs to render, as of one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub path: String,
    pub loading: bool,
    pub error: bool,
    pub error_message: Option<String>,
    pub navigation: Option<Arc<NavigationTree>>,
    pub current_selection_path: Vec<NavigationSection>,
    pub namespace_options: Vec<NamespaceOption>,
    pub selected_namespace: Option<NamespaceOption>,
    pub title: String,
    pub content: Option<Arc<ContentDocument>>,
}

impl ViewSnapshot {
    fn mounting(path: String) -> Self {
        Self {
            path,
            loading: true,
            error: false,
            error_message: None,
            navigation: None,
            current_selection_path: Vec::new(),
            namespace_options: Vec::new(),
            selected_namespace: None,
            title: String::new(),
            content: None,
        }
    }

    fn raise(&mut self, message: impl Into<String>) {
        self.error = true;
        self.error_message = Some(message.into());
    }

    fn clear_error(&mut self) {
        self.error = false;
        self.error_message = None;
    }

    fn select(&mut self, path: String) {
        self.current_selection_path = self
            .navigation
            .as_deref()
            .map(|nav| nav.selection_path(&path))
            .unwrap_or_default();
        self.path = path;
    }
}

// ── Messages ─────────────────────────────────────────────────────────

enum Command {
    Navigate(String),
    SelectNavigation(Vec<NavigationSection>),
    RequestNamespace {
        namespace: String,
        reply: oneshot::Sender<SwitchOutcome>,
    },
    SetError(Option<String>),
    ClearError,
}

enum Completion {
    InitialState {
        /// Path the load was started for.
        path: String,
        result: Result<InitialState, CoreError>,
    },
    NamespaceSwitch {
        ticket: SwitchTicket,
        result: Result<(), CoreError>,
        reply: oneshot::Sender<SwitchOutcome>,
    },
}

// ── SyncController ───────────────────────────────────────────────────

/// Handle to a running synchronization controller.
///
/// Cheaply cloneable. The controller stops when [`shutdown`](Self::shutdown)
/// is called or the last handle is dropped; either way its feed is closed.
#[derive(Clone)]
pub struct SyncController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ViewSnapshot>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncController {
    /// Start a controller over the HTTP backend described by `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(config: &ControllerConfig, initial_path: &str) -> Result<Self, CoreError> {
        let backend = HttpBackend::connect(config)?;
        info!(api_base = %config.api_base, "starting synchronization controller");

        let transport = HttpFeedTransport::new(backend.client().clone(), config.feed());
        Ok(Self::spawn(backend, transport, initial_path))
    }

    /// Start a controller and begin the initial mount.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<B: Backend, T: FeedTransport>(
        backend: B,
        transport: T,
        initial_path: impl Into<String>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ViewSnapshot::mounting(initial_path.into()));
        let cancel = CancellationToken::new();

        let actor = Actor {
            backend: Arc::new(backend),
            feeds: FeedSubscriptionManager::new(transport, signal_tx),
            switches: NamespaceSwitchCoordinator::new(),
            state: view_rx.borrow().clone(),
            view: view_tx,
            feed_namespace: None,
            mounted: false,
            completions: completion_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(actor.run(command_rx, signal_rx, completion_rx));

        Self {
            inner: Arc::new(ControllerInner {
                commands: command_tx,
                view: view_rx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    /// The current view state.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.inner.view.clone()
    }

    // ── Host commands ────────────────────────────────────────────────

    /// Routing update: the host moved to `path`.
    pub async fn navigate(&self, path: impl Into<String>) -> Result<(), CoreError> {
        self.send(Command::Navigate(path.into())).await
    }

    /// The host changed the highlighted navigation branch.
    pub async fn select_navigation(
        &self,
        selection: Vec<NavigationSection>,
    ) -> Result<(), CoreError> {
        self.send(Command::SelectNavigation(selection)).await
    }

    /// Ask for `namespace` to become active.
    ///
    /// Resolves once the backend has answered. Only the most recent
    /// request can commit; earlier ones come back as
    /// [`SwitchOutcome::Superseded`].
    pub async fn request_namespace(
        &self,
        namespace: impl Into<String>,
    ) -> Result<SwitchOutcome, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RequestNamespace {
            namespace: namespace.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| CoreError::ControllerStopped)
    }

    /// Raise a page-level error.
    pub async fn set_error(&self, message: Option<String>) -> Result<(), CoreError> {
        self.send(Command::SetError(message)).await
    }

    pub async fn clear_error(&self) -> Result<(), CoreError> {
        self.send(Command::ClearError).await
    }

    /// Stop the controller and close its feed. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let task = self.inner.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "controller task ended abnormally");
            }
        }
    }

    async fn send(&self, command: Command) -> Result<(), CoreError> {
        self.inner
            .commands
            .send(command)
            .await
            .map_err(|_| CoreError::ControllerStopped)
    }
}

// ── Actor ────────────────────────────────────────────────────────────

struct Actor<B, T: FeedTransport> {
    backend: Arc<B>,
    feeds: FeedSubscriptionManager<T>,
    switches: NamespaceSwitchCoordinator,
    state: ViewSnapshot,
    view: watch::Sender<ViewSnapshot>,
    /// Namespace the feed follows: the last one the backend accepted,
    /// which may differ from the displayed selection after a failed switch.
    feed_namespace: Option<String>,
    /// Set once the initial load has finished; no feed is opened before.
    mounted: bool,
    completions: mpsc::UnboundedSender<Completion>,
    cancel: CancellationToken,
}

impl<B: Backend, T: FeedTransport> Actor<B, T> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut signals: mpsc::UnboundedReceiver<FeedSignal>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        self.begin_mount();

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(completion) = completions.recv() => self.on_completion(completion),
                Some(signal) = signals.recv() => self.on_signal(signal),
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.on_command(command);
                }
            }
        }

        self.feeds.close();
        self.cancel.cancel();
        info!("synchronization controller stopped");
    }

    // ── Mount ────────────────────────────────────────────────────────

    fn begin_mount(&mut self) {
        self.state.loading = true;
        self.publish();

        let backend = Arc::clone(&self.backend);
        let path = self.state.path.clone();
        self.background(async move {
            let result = backend.initial_state(&path).await;
            Completion::InitialState { path, result }
        });
    }

    fn finish_mount(&mut self, requested: &str, result: Result<InitialState, CoreError>) {
        match result {
            Ok(initial) => {
                self.state.title = initial.title;
                self.state.namespace_options = initial.namespace_options;
                self.state.navigation = initial.navigation.map(Arc::new);

                // A switch committed or still in flight owns the namespace
                let selected = initial.selected_namespace.filter(|ns| !ns.value.is_empty());
                if self.feed_namespace.is_none() {
                    self.feed_namespace = selected.as_ref().map(|ns| ns.value.clone());
                    if self.switches.pending().is_none() {
                        self.state.selected_namespace = selected;
                    }
                }

                // The seed selection only describes the path it was loaded for
                let path = resolve_route(&self.state.path, self.state.navigation.as_deref());
                if path == self.state.path && path == requested {
                    self.state.current_selection_path = initial.selection_path;
                } else {
                    if path != self.state.path {
                        debug!(from = %self.state.path, to = %path, "redirecting initial path");
                    }
                    self.state.select(path);
                }
                info!(path = %self.state.path, "initial state loaded");
            }
            Err(e) => {
                warn!(error = %e, "initial state load failed");
                self.state.loading = false;
                self.state.raise(format!("Unable to load initial state: {e}"));
                self.state.path = resolve_route(&self.state.path, None);
            }
        }

        self.mounted = true;
        self.sync_feed();
        self.publish();
    }

    // ── Feed ─────────────────────────────────────────────────────────

    /// Point the feed at the current (path, namespace). Does nothing when
    /// neither has changed since the last call.
    fn sync_feed(&mut self) {
        if !self.mounted {
            return;
        }
        let namespace = self.feed_namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
        self.feeds
            .replace(SubscriptionKey::new(self.state.path.clone(), namespace));
    }

    fn on_signal(&mut self, signal: FeedSignal) {
        if !self.feeds.is_current(signal.connection) {
            debug!(connection = %signal.connection, "dropping signal from closed feed");
            return;
        }

        match signal.event {
            FeedEvent::Message(raw) => match content::parse(&raw) {
                Ok(document) => {
                    self.state.content = Some(Arc::new(document));
                    self.state.loading = false;
                    if self.state.error_message.as_deref() == Some(FEED_GONE_MESSAGE) {
                        self.state.clear_error();
                    }
                }
                Err(e) => debug!(error = %e, "dropping unparseable content"),
            },
            FeedEvent::Navigation(raw) => match decode_navigation(&raw) {
                Ok(tree) => {
                    self.state.current_selection_path = tree.selection_path(&self.state.path);
                    self.state.navigation = Some(Arc::new(tree));
                }
                Err(e) => debug!(error = %e, "dropping undecodable navigation"),
            },
            FeedEvent::Error(reason) => {
                warn!(connection = %signal.connection, reason = %reason, "content feed failed");
                self.state.loading = false;
                self.state.raise(FEED_GONE_MESSAGE);
            }
        }

        self.publish();
    }

    // ── Commands ─────────────────────────────────────────────────────

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Navigate(path) => {
                let path = resolve_route(&path, self.state.navigation.as_deref());
                self.state.select(path);
                self.sync_feed();
            }
            Command::SelectNavigation(selection) => {
                self.state.current_selection_path = selection;
            }
            Command::RequestNamespace { namespace, reply } => {
                self.begin_switch(namespace, reply);
            }
            Command::SetError(message) => {
                self.state
                    .raise(message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_owned()));
            }
            Command::ClearError => self.state.clear_error(),
        }
        self.publish();
    }

    // ── Namespace switching ──────────────────────────────────────────

    fn begin_switch(&mut self, namespace: String, reply: oneshot::Sender<SwitchOutcome>) {
        self.state.loading = true;
        self.state.clear_error();
        self.state.selected_namespace = Some(NamespaceOption::lookup(
            &self.state.namespace_options,
            &namespace,
        ));

        let ticket = self.switches.begin(namespace);
        debug!(namespace = %ticket.namespace(), generation = ticket.generation(), "namespace switch requested");

        let backend = Arc::clone(&self.backend);
        self.background(async move {
            let result = backend.activate_namespace(ticket.namespace()).await;
            Completion::NamespaceSwitch {
                ticket,
                result,
                reply,
            }
        });
    }

    fn finish_switch(
        &mut self,
        ticket: &SwitchTicket,
        result: Result<(), CoreError>,
        reply: oneshot::Sender<SwitchOutcome>,
    ) {
        let latest = self.switches.is_latest(ticket);
        let outcome = self.switches.resolve(ticket, result);

        match &outcome {
            SwitchOutcome::Committed { namespace } => {
                info!(namespace = %namespace, "namespace switched");
                self.state.selected_namespace = Some(NamespaceOption::lookup(
                    &self.state.namespace_options,
                    namespace,
                ));
                self.feed_namespace = Some(namespace.clone());
                if let Some(deepest) = self.state.current_selection_path.last() {
                    self.state.path = deepest.path.clone();
                }
                self.state.loading = false;
                self.state.clear_error();
                self.sync_feed();
                self.publish();
            }
            SwitchOutcome::Failed { namespace, reason } if latest => {
                warn!(namespace = %namespace, reason = %reason, "namespace switch failed");
                self.state.loading = false;
                self.state.raise(
                    CoreError::NamespaceActivation {
                        namespace: namespace.clone(),
                        reason: reason.clone(),
                    }
                    .to_string(),
                );
                self.publish();
            }
            _ => debug!(%outcome, "stale namespace switch ignored"),
        }

        let _ = reply.send(outcome);
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::InitialState { path, result } => self.finish_mount(&path, result),
            Completion::NamespaceSwitch {
                ticket,
                result,
                reply,
            } => self.finish_switch(&ticket, result, reply),
        }
    }

    /// Run `work` off the actor; its result comes back as a completion.
    fn background<F>(&self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let completions = self.completions.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                completion = work => {
                    let _ = completions.send(completion);
                }
            }
        });
    }

    fn publish(&self) {
        self.view.send_if_modified(|view| {
            if *view == self.state {
                false
            } else {
                view.clone_from(&self.state);
                true
            }
        });
    }
}
