// ── Domain model ──
//
// Canonical types shared by the feed manager, the controller and views.

pub mod content;
pub mod namespace;
pub mod navigation;

pub use content::{ContentDocument, ParseError};
pub use namespace::{DEFAULT_NAMESPACE, NamespaceOption};
pub use navigation::{FALLBACK_ROOT_PATH, NavigationSection, NavigationTree, resolve_route};
