//! First-paragraph summary extraction.
//!
//! Page descriptions come from the leading paragraph of the owning
//! module's docstring, mined with pulldown-cmark so that inline markup
//! collapses to plain text.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Extract the first paragraph of a markdown document as plain text.
///
/// Inline code keeps its content, formatting is dropped, and soft line
/// breaks collapse to spaces. Returns `None` when the document has no
/// leading paragraph.
pub(crate) fn first_paragraph(markdown: &str) -> Option<String> {
    let mut in_paragraph = false;
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    in_paragraph = false;
                    text.clear();
                } else {
                    return Some(trimmed.to_owned());
                }
            }
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }
    None
}
