//! Page assembly.

use mx_extract::{ApiEntry, EntryKind, Registry, ValidationStatus};
use mx_validate::{ValidationIssue, line_col};

use crate::signature::format_signature;
use crate::summary::first_paragraph;

/// Sidebar labels longer than this squish the navigation menu.
const SIDEBAR_TITLE_MAX: usize = 23;

/// Renderer settings.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// `owner/repo` for source links; links are omitted when unset.
    pub github_repo: Option<String>,
    /// Branch or tag the source links point at.
    pub github_branch: String,
    /// Include per-issue detail inside placeholder stubs.
    pub show_errors: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            github_repo: None,
            github_branch: "main".to_owned(),
            show_errors: true,
        }
    }
}

/// One rendered output page: a category and the entries it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Category label, as declared in the allow-list.
    pub category: String,
    /// Output file stem, also the navigation path segment.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Qualified names of the entries on this page, in declaration order.
    pub entries: Vec<String>,
    /// Full MDX body, frontmatter included.
    pub body: String,
}

/// Pure renderer: validated registry in, ordered page set out.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Render one page per category, in declared category order.
    ///
    /// `issues` is the full validation report; each entry's issues are
    /// looked up by qualified name when its placeholder is rendered.
    #[must_use]
    pub fn render(&self, registry: &Registry, issues: &[ValidationIssue]) -> Vec<Page> {
        registry
            .categories()
            .into_iter()
            .map(|category| {
                let entries: Vec<&ApiEntry> = registry
                    .iter()
                    .filter(|e| e.category == category)
                    .collect();
                self.render_page(category, &entries, issues)
            })
            .collect()
    }

    fn render_page(&self, category: &str, entries: &[&ApiEntry], issues: &[ValidationIssue]) -> Page {
        let short = category.rsplit('.').next().unwrap_or(category);
        let mut body = String::new();

        body.push_str("---\n");
        body.push_str(&format!("title: \"{}\"\n", escape_yaml(category)));
        body.push_str(&format!(
            "sidebarTitle: \"{}\"\n",
            escape_yaml(truncate_sidebar_title(short))
        ));
        if let Some(description) = self.page_description(category, entries) {
            body.push_str(&format!("description: \"{}\"\n", escape_yaml(&description)));
        }
        body.push_str("---\n");

        for entry in entries {
            body.push('\n');
            self.render_entry(entry, issues, &mut body);
        }

        Page {
            category: category.to_owned(),
            slug: sanitize_path(category),
            title: category.to_owned(),
            entries: entries.iter().map(|e| e.qualified_name.clone()).collect(),
            body,
        }
    }

    /// The first paragraph of the category's own module docstring, when the
    /// module entry exists and validated clean.
    fn page_description(&self, category: &str, entries: &[&ApiEntry]) -> Option<String> {
        let module = entries.iter().find(|e| {
            e.kind == EntryKind::Module
                && e.qualified_name == category
                && e.status() == ValidationStatus::Valid
        })?;
        first_paragraph(&module.doc)
    }

    fn render_entry(&self, entry: &ApiEntry, issues: &[ValidationIssue], body: &mut String) {
        let is_intro = entry.kind == EntryKind::Module && entry.qualified_name == entry.category;

        if !is_intro {
            body.push_str(&format!("## `{}`\n\n", entry.name()));
        }

        if entry.status() != ValidationStatus::Valid {
            self.render_placeholder(entry, issues, body);
            return;
        }

        if !is_intro {
            if let Some(url) = self.source_url(entry) {
                body.push_str(&format!("[View source]({url})\n\n"));
            }
            if let Some(signature) = &entry.signature {
                body.push_str("```python\n");
                body.push_str(&format_signature(entry.name(), signature));
                body.push_str("\n```\n\n");
            }
        }

        if entry.doc.is_empty() {
            body.push_str("*No documentation available.*\n");
        } else {
            body.push_str(&entry.doc);
            if !entry.doc.ends_with('\n') {
                body.push('\n');
            }
        }
    }

    /// The stub shown in place of an entry whose docstring failed
    /// validation. The raw text never reaches the page.
    fn render_placeholder(&self, entry: &ApiEntry, issues: &[ValidationIssue], body: &mut String) {
        let own: Vec<&ValidationIssue> = issues
            .iter()
            .filter(|i| i.entry == entry.qualified_name)
            .collect();

        body.push_str("<Warning>\n");
        body.push_str(&format!(
            "Documentation omitted - {} structural issue(s). See the issue report for `{}`.\n",
            own.len(),
            entry.qualified_name
        ));
        if self.config.show_errors && !own.is_empty() {
            body.push('\n');
            for issue in own {
                let (line, column) = line_col(&entry.doc, issue.start);
                body.push_str(&format!("- {} at {line}:{column}\n", issue.rule));
            }
        }
        body.push_str("</Warning>\n");
    }

    fn source_url(&self, entry: &ApiEntry) -> Option<String> {
        let repo = self.config.github_repo.as_deref()?;
        let path = entry.category.replace('.', "/");
        Some(format!(
            "https://github.com/{repo}/blob/{}/{path}.py",
            self.config.github_branch
        ))
    }
}

/// Convert a category label to a file stem / navigation segment.
fn sanitize_path(text: &str) -> String {
    text.to_lowercase()
        .replace([' ', '/', '.'], "-")
}

/// Escape a string for double-quoted YAML frontmatter.
fn escape_yaml(text: &str) -> String {
    text.replace('"', "'")
}

/// Clip a sidebar label so the navigation column keeps its width.
fn truncate_sidebar_title(title: &str) -> &str {
    if title.len() <= SIDEBAR_TITLE_MAX {
        title
    } else {
        &title[..SIDEBAR_TITLE_MAX]
    }
}
