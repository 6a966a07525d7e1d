// ── Backend seam ──
//
// The two request/response calls the controller makes besides the feed:
// loading the seed display state on mount, and activating a namespace.

use std::sync::Arc;

use dashfeed_api::ApiClient;
use serde::Serialize;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{NamespaceOption, NavigationSection, NavigationTree};

/// Seed display state assembled on mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitialState {
    pub title: String,
    pub navigation: Option<NavigationTree>,
    pub namespace_options: Vec<NamespaceOption>,
    pub selected_namespace: Option<NamespaceOption>,
    pub selection_path: Vec<NavigationSection>,
}

/// Namespaces the backend offers, and the one it currently resolves in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceListing {
    pub options: Vec<NamespaceOption>,
    pub current: String,
}

/// Request/response side of the dashboard backend.
pub trait Backend: Send + Sync + 'static {
    /// Load everything the view needs before the first feed event.
    fn initial_state(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<InitialState, CoreError>> + Send;

    /// Make `namespace` the backend's active namespace.
    fn activate_namespace(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<B: Backend> Backend for Arc<B> {
    fn initial_state(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<InitialState, CoreError>> + Send {
        B::initial_state(self, path)
    }

    fn activate_namespace(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        B::activate_namespace(self, namespace)
    }
}

// ── HttpBackend ──────────────────────────────────────────────────────

/// [`Backend`] over the dashboard REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
    title: String,
}

impl HttpBackend {
    pub fn new(client: ApiClient, title: impl Into<String>) -> Self {
        Self {
            client,
            title: title.into(),
        }
    }

    /// Build a backend for `config` without starting a controller.
    pub fn connect(config: &ControllerConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_base.clone(), &config.transport())?;
        Ok(Self::new(client, config.title.clone()))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn namespaces(&self) -> Result<NamespaceListing, CoreError> {
        let (namespaces, current) = tokio::try_join!(
            self.client.namespaces(),
            self.client.current_namespace(),
        )?;
        Ok(NamespaceListing {
            options: namespaces.into_iter().map(NamespaceOption::from).collect(),
            current,
        })
    }
}

impl Backend for HttpBackend {
    async fn initial_state(&self, path: &str) -> Result<InitialState, CoreError> {
        let (namespaces, current, navigation) = tokio::try_join!(
            self.client.namespaces(),
            self.client.current_namespace(),
            self.client.navigation(),
        )?;

        let namespace_options: Vec<NamespaceOption> =
            namespaces.into_iter().map(NamespaceOption::from).collect();
        let selected_namespace = (!current.is_empty())
            .then(|| NamespaceOption::lookup(&namespace_options, &current));
        let navigation = NavigationTree::from(navigation);
        let selection_path = navigation.selection_path(path);

        debug!(
            namespaces = namespace_options.len(),
            sections = navigation.sections.len(),
            current = %current,
            "initial state loaded"
        );

        Ok(InitialState {
            title: self.title.clone(),
            navigation: Some(navigation),
            namespace_options,
            selected_namespace,
            selection_path,
        })
    }

    async fn activate_namespace(&self, namespace: &str) -> Result<(), CoreError> {
        self.client.set_namespace(namespace).await?;
        Ok(())
    }
}
