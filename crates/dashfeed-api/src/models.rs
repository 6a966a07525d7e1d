// Wire types for the dashboard REST endpoints.
//
// These mirror the backend's JSON exactly; `dashfeed-core` converts them
// into its domain model.

use serde::{Deserialize, Serialize};

/// `GET /api/v1/namespaces`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NamespacesResponse {
    #[serde(default)]
    pub namespaces: Vec<String>,
}

/// `GET /api/v1/namespace` and the body of `POST /api/v1/namespace`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamespaceBody {
    pub namespace: String,
}

/// `GET /api/v1/navigation`, also the payload of `navigation` feed events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavigationPayload {
    #[serde(default)]
    pub sections: Vec<NavigationSectionPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavigationSectionPayload {
    #[serde(default)]
    pub title: String,
    pub path: String,
    #[serde(default)]
    pub children: Vec<NavigationSectionPayload>,
}
