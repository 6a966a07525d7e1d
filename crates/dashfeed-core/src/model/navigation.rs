// ── Navigation tree ──
//
// Section tree pushed by the backend, plus the two lookups the
// synchronization controller needs: which sections the current path sits
// under, and where an unmatched path should land.

use serde::Serialize;

/// Landing path used before any navigation data is available.
pub const FALLBACK_ROOT_PATH: &str = "/content/overview/";

/// Ordered top-level sections. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationTree {
    pub sections: Vec<NavigationSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationSection {
    pub title: String,
    pub path: String,
    pub children: Vec<NavigationSection>,
}

impl NavigationSection {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NavigationSection>) -> Self {
        self.children = children;
        self
    }

    /// Whether `path` is this section or lies beneath it.
    fn contains(&self, path: &str) -> bool {
        let own = self.path.trim_end_matches('/');
        let path = path.trim_end_matches('/');
        if own.is_empty() {
            return false;
        }
        path == own
            || path
                .strip_prefix(own)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl NavigationTree {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Path of the first top-level section.
    pub fn first_path(&self) -> Option<&str> {
        self.sections.first().map(|s| s.path.as_str())
    }

    /// Sections from the root down to the deepest one containing `path`.
    ///
    /// At each level the most specific (longest) matching section wins.
    /// Empty when nothing matches.
    pub fn selection_path(&self, path: &str) -> Vec<NavigationSection> {
        let mut selected = Vec::new();
        let mut level = &self.sections;

        while let Some(section) = level
            .iter()
            .filter(|s| s.contains(path))
            .max_by_key(|s| s.path.trim_end_matches('/').len())
        {
            selected.push(section.clone());
            level = &section.children;
        }

        selected
    }
}

/// Where the view should be for a requested path.
///
/// The root path goes to the first navigation section, or to
/// [`FALLBACK_ROOT_PATH`] while no navigation has arrived. Once navigation
/// is known, a path no section contains also goes to the first section.
pub fn resolve_route(path: &str, navigation: Option<&NavigationTree>) -> String {
    let first = navigation.and_then(NavigationTree::first_path);

    if path.is_empty() || path == "/" {
        return first.unwrap_or(FALLBACK_ROOT_PATH).to_owned();
    }

    match (navigation, first) {
        (Some(nav), Some(first)) if nav.selection_path(path).is_empty() => first.to_owned(),
        _ => path.to_owned(),
    }
}
