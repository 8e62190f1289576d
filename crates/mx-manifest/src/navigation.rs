//! The docs.json-shaped navigation model.

use serde::{Deserialize, Serialize};

use mx_render::Page;

use crate::PATH_TOKEN;

/// One navigation group: a label and its page paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    pub group: String,
    pub pages: Vec<String>,
}

/// A version dropdown within the tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dropdown {
    pub dropdown: String,
    pub icon: String,
    pub groups: Vec<NavGroup>,
}

/// The generated navigation document: one tab, one `latest` dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub tab: String,
    pub dropdowns: Vec<Dropdown>,
}

impl Navigation {
    /// Build navigation from the rendered page set, in page order.
    ///
    /// Every page path is emitted under [`PATH_TOKEN`], ready for the
    /// version path rewriter.
    #[must_use]
    pub fn from_pages(tab: impl Into<String>, pages: &[Page]) -> Self {
        let groups = pages
            .iter()
            .map(|page| NavGroup {
                group: page.title.clone(),
                pages: vec![format!("{PATH_TOKEN}{}", page.slug)],
            })
            .collect();

        Self {
            tab: tab.into(),
            dropdowns: vec![Dropdown {
                dropdown: "latest".to_owned(),
                icon: "rocket".to_owned(),
                groups,
            }],
        }
    }

    /// Serialize to the JSON document the artifact tree carries.
    ///
    /// # Panics
    ///
    /// Never panics: the model contains only strings and sequences.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// A published deployment of one build: version or PR identifier, the path
/// prefix carried into navigation, and the page paths in navigation order.
///
/// Immutable after creation; produced by the rewriter once every
/// placeholder is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionManifest {
    pub version: String,
    pub prefix: String,
    pub pages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(title: &str, slug: &str) -> Page {
        Page {
            category: title.to_owned(),
            slug: slug.to_owned(),
            title: title.to_owned(),
            entries: Vec::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_from_pages_preserves_order() {
        let pages = vec![page("pkg", "pkg"), page("pkg.io", "pkg-io")];
        let nav = Navigation::from_pages("SDK", &pages);

        assert_eq!(nav.tab, "SDK");
        assert_eq!(nav.dropdowns.len(), 1);
        assert_eq!(nav.dropdowns[0].dropdown, "latest");

        let groups: Vec<&str> = nav.dropdowns[0]
            .groups
            .iter()
            .map(|g| g.group.as_str())
            .collect();
        assert_eq!(groups, vec!["pkg", "pkg.io"]);
    }

    #[test]
    fn test_page_paths_carry_token() {
        let nav = Navigation::from_pages("SDK", &[page("pkg", "pkg")]);
        assert_eq!(
            nav.dropdowns[0].groups[0].pages,
            vec!["sdk/latest/pkg".to_owned()]
        );
    }

    #[test]
    fn test_to_value_round_trips() {
        let nav = Navigation::from_pages("SDK", &[page("pkg", "pkg")]);
        let value = nav.to_value();
        let back: Navigation = serde_json::from_value(value).unwrap();
        assert_eq!(back, nav);
    }
}
