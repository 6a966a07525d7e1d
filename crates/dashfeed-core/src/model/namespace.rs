use serde::Serialize;

/// Namespace used when none has been selected.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A selectable namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamespaceOption {
    pub value: String,
    pub label: String,
}

impl NamespaceOption {
    /// An option labelled with its own value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    /// Find `value` among `options`, or build an unlabelled option for it.
    pub fn lookup(options: &[NamespaceOption], value: &str) -> Self {
        options
            .iter()
            .find(|o| o.value == value)
            .cloned()
            .unwrap_or_else(|| Self::new(value))
    }
}
