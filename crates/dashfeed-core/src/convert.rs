// ── API-to-domain type conversions ──
//
// Bridges raw `dashfeed_api` wire types into canonical domain types.

use dashfeed_api::{NavigationPayload, NavigationSectionPayload};

use crate::model::{NamespaceOption, NavigationSection, NavigationTree};

impl From<NavigationSectionPayload> for NavigationSection {
    fn from(raw: NavigationSectionPayload) -> Self {
        Self {
            title: raw.title,
            path: raw.path,
            children: raw.children.into_iter().map(Self::from).collect(),
        }
    }
}

impl From<NavigationPayload> for NavigationTree {
    fn from(raw: NavigationPayload) -> Self {
        Self {
            sections: raw.sections.into_iter().map(NavigationSection::from).collect(),
        }
    }
}

impl From<String> for NamespaceOption {
    fn from(value: String) -> Self {
        NamespaceOption::new(value)
    }
}

/// Decode a `navigation` feed payload.
pub fn decode_navigation(raw: &str) -> Result<NavigationTree, serde_json::Error> {
    serde_json::from_str::<NavigationPayload>(raw).map(NavigationTree::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn nested_sections_convert() {
        let tree = decode_navigation(
            r#"{"sections":[{"title":"Overview","path":"/o","children":[{"path":"/o/w"}]}]}"#,
        )
        .unwrap();

        assert_eq!(tree.sections.len(), 1);
        assert_eq!(tree.sections[0].children[0].path, "/o/w");
        assert_eq!(tree.sections[0].children[0].title, "");
    }

    #[test]
    fn missing_sections_decode_as_empty() {
        assert!(decode_navigation("{}").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_navigation("[1,2]").is_err());
    }
}
