//! The version path rewriter.

use serde_json::Value;

use crate::{PATH_TOKEN, VersionManifest};

/// Fatal rewrite defect.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RewriteError {
    /// The placeholder never occurs in the document. Either the manifest
    /// was already rewritten with a different prefix or it was never
    /// generated correctly; both are build defects.
    #[error("no `{0}` placeholder found in the navigation manifest")]
    UnresolvedToken(String),
}

/// Rewrites the placeholder token in a serialized navigation document.
///
/// Walks every JSON string in the document, so nested and repeated
/// references are all covered, and prepends `prefix/` to each token
/// occurrence. Occurrences already carrying the prefix are left alone,
/// which makes applying the same rewrite twice a no-op.
#[derive(Debug, Clone)]
pub struct VersionPathRewriter {
    token: String,
    prefix: String,
}

impl VersionPathRewriter {
    /// Rewriter for the standard [`PATH_TOKEN`] placeholder.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_token(PATH_TOKEN, prefix)
    }

    /// Rewriter for a custom placeholder token.
    #[must_use]
    pub fn with_token(token: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            prefix: prefix.into(),
        }
    }

    /// Rewrite the document in place, returning how many placeholder
    /// occurrences were seen.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnresolvedToken`] when the document contains
    /// no occurrence at all.
    pub fn rewrite(&self, doc: &mut Value) -> Result<usize, RewriteError> {
        let mut count = 0;
        self.rewrite_value(doc, &mut count);
        if count == 0 {
            return Err(RewriteError::UnresolvedToken(self.token.clone()));
        }
        Ok(count)
    }

    /// Rewrite the document and describe the deployment it now addresses.
    ///
    /// The manifest records the rewritten page paths in navigation order,
    /// collected from every `pages` array in the document.
    pub fn manifest(
        &self,
        doc: &mut Value,
        version: impl Into<String>,
    ) -> Result<VersionManifest, RewriteError> {
        self.rewrite(doc)?;

        let mut pages = Vec::new();
        collect_pages(doc, &mut pages);

        Ok(VersionManifest {
            version: version.into(),
            prefix: self.prefix.clone(),
            pages,
        })
    }

    fn rewrite_value(&self, value: &mut Value, count: &mut usize) {
        match value {
            Value::String(s) => {
                if s.contains(self.token.as_str()) {
                    let (rewritten, seen) = self.rewrite_string(s);
                    *s = rewritten;
                    *count += seen;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_value(item, count);
                }
            }
            Value::Object(map) => {
                for (_, item) in map {
                    self.rewrite_value(item, count);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn rewrite_string(&self, s: &str) -> (String, usize) {
        let insert = format!("{}/", self.prefix);
        let mut out = String::with_capacity(s.len() + insert.len());
        let mut cursor = 0;
        let mut seen = 0;

        while let Some(pos) = s[cursor..].find(self.token.as_str()) {
            let at = cursor + pos;
            seen += 1;
            out.push_str(&s[cursor..at]);
            if !s[..at].ends_with(&insert) {
                out.push_str(&insert);
            }
            out.push_str(&self.token);
            cursor = at + self.token.len();
        }
        out.push_str(&s[cursor..]);
        (out, seen)
    }
}

/// Collect every string under a `pages` key, in document order.
fn collect_pages(value: &Value, pages: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                if key == "pages" {
                    if let Value::Array(items) = item {
                        for entry in items {
                            match entry {
                                Value::String(s) => pages.push(s.clone()),
                                nested => collect_pages(nested, pages),
                            }
                        }
                        continue;
                    }
                }
                collect_pages(item, pages);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_pages(item, pages);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rewrite_prepends_prefix() {
        let mut doc = json!({"path": "sdk/latest/table"});
        let count = VersionPathRewriter::new("pr-42").rewrite(&mut doc).unwrap();

        assert_eq!(count, 1);
        assert_eq!(doc, json!({"path": "pr-42/sdk/latest/table"}));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let rewriter = VersionPathRewriter::new("pr-42");
        let mut doc = json!({"path": "sdk/latest/table"});
        rewriter.rewrite(&mut doc).unwrap();
        let after_first = doc.clone();

        rewriter.rewrite(&mut doc).unwrap();
        assert_eq!(doc, after_first);
    }

    #[test]
    fn test_rewrite_same_result_from_original() {
        let rewriter = VersionPathRewriter::new("pr-42");
        let mut a = json!({"path": "sdk/latest/table"});
        let mut b = json!({"path": "sdk/latest/table"});

        rewriter.rewrite(&mut a).unwrap();
        rewriter.rewrite(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let mut doc = json!({"path": "guides/quickstart"});
        let err = VersionPathRewriter::new("pr-42")
            .rewrite(&mut doc)
            .unwrap_err();

        assert_eq!(err, RewriteError::UnresolvedToken("sdk/latest/".to_owned()));
    }

    #[test]
    fn test_nested_and_repeated_references_all_rewritten() {
        let mut doc = json!({
            "tab": "SDK",
            "dropdowns": [{
                "dropdown": "latest",
                "groups": [
                    {"group": "pkg", "pages": ["sdk/latest/pkg"]},
                    {"group": "pkg.io", "pages": [
                        "sdk/latest/pkg-io",
                        {"group": "nested", "pages": ["sdk/latest/deep"]}
                    ]}
                ]
            }]
        });
        let count = VersionPathRewriter::new("v0.4.2").rewrite(&mut doc).unwrap();

        assert_eq!(count, 3);
        let text = doc.to_string();
        assert!(!text.contains("\"sdk/latest/"));
        assert!(text.contains("v0.4.2/sdk/latest/pkg"));
        assert!(text.contains("v0.4.2/sdk/latest/deep"));
    }

    #[test]
    fn test_multiple_occurrences_in_one_string() {
        let mut doc = json!("sdk/latest/a and sdk/latest/b");
        let count = VersionPathRewriter::new("pr-7").rewrite(&mut doc).unwrap();

        assert_eq!(count, 2);
        assert_eq!(doc, json!("pr-7/sdk/latest/a and pr-7/sdk/latest/b"));
    }

    #[test]
    fn test_manifest_collects_rewritten_pages_in_order() {
        let mut doc = json!({
            "dropdowns": [{
                "groups": [
                    {"group": "a", "pages": ["sdk/latest/a"]},
                    {"group": "b", "pages": ["sdk/latest/b"]}
                ]
            }]
        });
        let manifest = VersionPathRewriter::new("v1.0.0")
            .manifest(&mut doc, "v1.0.0")
            .unwrap();

        assert_eq!(manifest.version, "v1.0.0");
        assert_eq!(manifest.prefix, "v1.0.0");
        assert_eq!(
            manifest.pages,
            vec!["v1.0.0/sdk/latest/a".to_owned(), "v1.0.0/sdk/latest/b".to_owned()]
        );
    }

    #[test]
    fn test_custom_token() {
        let mut doc = json!({"path": "docs/current/intro"});
        let count = VersionPathRewriter::with_token("docs/current/", "pr-9")
            .rewrite(&mut doc)
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(doc, json!({"path": "pr-9/docs/current/intro"}));
    }
}
