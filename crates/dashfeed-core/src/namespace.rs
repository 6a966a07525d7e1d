// ── Namespace switch coordination ──
//
// Namespace switches are asynchronous and may complete in any order. Each
// request takes a ticket; only the ticket of the most recent request may
// commit. Older completions are reported as superseded and change nothing.

use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Identifies one switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    generation: u64,
    namespace: String,
}

impl SwitchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// How a switch request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// The backend accepted the namespace and the feed now follows it.
    Committed { namespace: String },
    /// A newer request was made before this one completed.
    Superseded { namespace: String },
    /// The backend rejected the switch; the previous namespace stays active.
    Failed { namespace: String, reason: String },
}

impl SwitchOutcome {
    pub fn namespace(&self) -> &str {
        match self {
            Self::Committed { namespace }
            | Self::Superseded { namespace }
            | Self::Failed { namespace, .. } => namespace,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

impl fmt::Display for SwitchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed { namespace } => write!(f, "switched to {namespace}"),
            Self::Superseded { namespace } => {
                write!(f, "switch to {namespace} superseded by a newer request")
            }
            Self::Failed { namespace, reason } => {
                write!(f, "switch to {namespace} failed: {reason}")
            }
        }
    }
}

/// Last-writer-wins arbiter for namespace switches.
#[derive(Debug, Default)]
pub struct NamespaceSwitchCoordinator {
    generation: u64,
    pending: Option<SwitchTicket>,
}

impl NamespaceSwitchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request, superseding any still in flight.
    pub fn begin(&mut self, namespace: impl Into<String>) -> SwitchTicket {
        self.generation += 1;
        let ticket = SwitchTicket {
            generation: self.generation,
            namespace: namespace.into(),
        };
        if let Some(previous) = self.pending.replace(ticket.clone()) {
            debug!(
                superseded = %previous.namespace,
                by = %ticket.namespace,
                "namespace switch superseded"
            );
        }
        ticket
    }

    /// The request currently awaiting completion, if any.
    pub fn pending(&self) -> Option<&SwitchTicket> {
        self.pending.as_ref()
    }

    /// Whether `ticket` belongs to the most recent request.
    ///
    /// Compared by generation, so requesting the same namespace twice still
    /// supersedes the first request.
    pub fn is_latest(&self, ticket: &SwitchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Settle a completed request.
    ///
    /// A failure is always reported as `Failed`; callers must still check
    /// [`is_latest`](Self::is_latest) before letting it touch shared state.
    pub fn resolve<E: fmt::Display>(
        &mut self,
        ticket: &SwitchTicket,
        result: Result<(), E>,
    ) -> SwitchOutcome {
        let namespace = ticket.namespace.clone();
        let latest = self.is_latest(ticket);
        if latest {
            self.pending = None;
        }

        match result {
            Err(e) => SwitchOutcome::Failed {
                namespace,
                reason: e.to_string(),
            },
            Ok(()) if latest => SwitchOutcome::Committed { namespace },
            Ok(()) => SwitchOutcome::Superseded { namespace },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn later_request_wins_regardless_of_completion_order() {
        let mut switches = NamespaceSwitchCoordinator::new();
        let a = switches.begin("a");
        let b = switches.begin("b");

        assert_eq!(
            switches.resolve(&b, Ok::<(), String>(())),
            SwitchOutcome::Committed {
                namespace: "b".into()
            }
        );
        assert_eq!(
            switches.resolve(&a, Ok::<(), String>(())),
            SwitchOutcome::Superseded {
                namespace: "a".into()
            }
        );
    }

    #[test]
    fn earlier_completion_of_stale_request_is_superseded() {
        let mut switches = NamespaceSwitchCoordinator::new();
        let a = switches.begin("a");
        let b = switches.begin("b");

        assert!(!switches.resolve(&a, Ok::<(), String>(())).is_committed());
        assert_eq!(switches.pending(), Some(&b));
        assert!(switches.resolve(&b, Ok::<(), String>(())).is_committed());
        assert_eq!(switches.pending(), None);
    }

    #[test]
    fn repeating_a_namespace_still_supersedes() {
        let mut switches = NamespaceSwitchCoordinator::new();
        let first = switches.begin("apps");
        let second = switches.begin("apps");

        assert!(!switches.is_latest(&first));
        assert!(switches.is_latest(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn failure_of_latest_is_reported() {
        let mut switches = NamespaceSwitchCoordinator::new();
        let ticket = switches.begin("locked");

        let outcome = switches.resolve(&ticket, Err("forbidden"));
        assert_eq!(
            outcome,
            SwitchOutcome::Failed {
                namespace: "locked".into(),
                reason: "forbidden".into()
            }
        );
        assert_eq!(outcome.to_string(), "switch to locked failed: forbidden");
    }

    #[test]
    fn stale_failure_is_still_failed_but_keeps_latest_pending() {
        let mut switches = NamespaceSwitchCoordinator::new();
        let a = switches.begin("a");
        let b = switches.begin("b");

        let outcome = switches.resolve(&a, Err("boom"));
        assert!(matches!(outcome, SwitchOutcome::Failed { .. }));
        assert!(!switches.is_latest(&a));
        assert_eq!(switches.pending(), Some(&b));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(SwitchOutcome::Committed {
            namespace: "apps".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "committed", "namespace": "apps" }));
    }
}
