//! The rule scans.
//!
//! Each scan walks the full text independently; none short-circuits, and
//! the caller collects everything. Scans that only make sense in prose run
//! over the ranges outside fenced blocks so that example code never trips
//! them.

use crate::fence::{self, FenceMap, MarkerKind};
use crate::{RuleKind, ValidationIssue};

/// HTML void elements the target renderer refuses to leave unclosed.
const VOID_ELEMENTS: &[&str] = &[
    "img", "br", "hr", "input", "source", "area", "base", "col", "embed", "link", "meta", "param",
    "track", "wbr",
];

pub(crate) fn scan_all(entry: &str, text: &str, map: &FenceMap) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    fence_attached_to_delimiter(entry, text, map, &mut issues);
    unbalanced_fence(entry, text, map, &mut issues);
    adjacent_double_fence(entry, map, &mut issues);
    unpaired_inline_delimiter(entry, text, map, &mut issues);
    non_self_closing_tag(entry, text, map, &mut issues);
    escaped_link_bracket(entry, text, map, &mut issues);
    broken_repl_continuation(entry, text, map, &mut issues);
    issues
}

fn issue(
    entry: &str,
    rule: RuleKind,
    start: usize,
    end: usize,
    message: impl Into<String>,
) -> ValidationIssue {
    ValidationIssue {
        entry: entry.to_owned(),
        rule,
        start,
        end,
        message: message.into(),
    }
}

/// `)```` and friends: a closing delimiter with the fence marker glued to it.
fn fence_attached_to_delimiter(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    let bytes = text.as_bytes();
    for (start, end) in map.outside_ranges(text.len()) {
        let mut i = start;
        while i + 3 < end {
            if matches!(bytes[i], b')' | b'}' | b']') && &bytes[i + 1..i + 4] == b"```" {
                let mut run_end = i + 4;
                while run_end < end && bytes[run_end] == b'`' {
                    run_end += 1;
                }
                issues.push(issue(
                    entry,
                    RuleKind::FenceAttachedToDelimiter,
                    i,
                    run_end,
                    format!(
                        "fence marker attached to `{}`; fence markers must start their own line",
                        bytes[i] as char
                    ),
                ));
                i = run_end;
            } else {
                i += 1;
            }
        }
    }
}

/// A fence opened but never closed before end of text.
fn unbalanced_fence(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(offset) = map.unclosed() {
        let run = text[offset..]
            .chars()
            .take_while(|&c| c == '`' || c == '~')
            .count();
        issues.push(issue(
            entry,
            RuleKind::UnbalancedFence,
            offset,
            offset + run,
            "fence opened here is never closed; everything after it parses as raw markup",
        ));
    }
}

/// A closing fence line directly followed by an opening fence line.
fn adjacent_double_fence(entry: &str, map: &FenceMap, issues: &mut Vec<ValidationIssue>) {
    for pair in map.markers().windows(2) {
        let [close, open] = pair else { continue };
        if close.kind == MarkerKind::Close
            && open.kind == MarkerKind::Open
            && open.line_start == close.line_end
        {
            issues.push(issue(
                entry,
                RuleKind::AdjacentDoubleFence,
                close.offset,
                open.line_end,
                "closing fence directly followed by an opening fence; the empty block is a renderer syntax error",
            ));
        }
    }
}

/// Odd lone-backtick parity outside fences, and escaped-next-to-unescaped
/// backtick pairs.
fn unpaired_inline_delimiter(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    let bytes = text.as_bytes();
    let mut lone = Vec::new();

    for (start, end) in map.outside_ranges(text.len()) {
        let mut i = start;
        while i < end {
            if bytes[i] != b'`' {
                i += 1;
                continue;
            }

            let run_start = i;
            while i < end && bytes[i] == b'`' {
                i += 1;
            }
            let run_len = i - run_start;

            if is_escaped(bytes, run_start) {
                if run_len >= 2 {
                    issues.push(issue(
                        entry,
                        RuleKind::UnpairedInlineDelimiter,
                        run_start,
                        run_start + 2,
                        "escaped backtick glued to an unescaped one; the inline span will not parse",
                    ));
                }
                // A lone escaped backtick is a literal character.
            } else if run_len == 1 {
                lone.push(run_start);
            }
            // Runs of two or more unescaped backticks pair up on their own;
            // glued triple runs are FenceAttachedToDelimiter territory.
        }
    }

    if lone.len() % 2 == 1 {
        if let Some(&at) = lone.last() {
            issues.push(issue(
                entry,
                RuleKind::UnpairedInlineDelimiter,
                at,
                at + 1,
                "odd number of inline code backticks outside fenced blocks; an inline span never closes",
            ));
        }
    }
}

/// A void element opened without `/>` and without a matching close tag.
fn non_self_closing_tag(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    let bytes = text.as_bytes();
    for (start, end) in map.outside_ranges(text.len()) {
        let mut i = start;
        while i < end {
            if bytes[i] != b'<' {
                i += 1;
                continue;
            }

            let name_start = i + 1;
            let mut j = name_start;
            while j < end && bytes[j].is_ascii_alphanumeric() {
                j += 1;
            }
            let name = text[name_start..j].to_ascii_lowercase();
            if name.is_empty() || !VOID_ELEMENTS.contains(&name.as_str()) {
                i = j.max(i + 1);
                continue;
            }
            // Require a real tag boundary after the name.
            if j < end && !matches!(bytes[j], b' ' | b'\t' | b'\n' | b'>' | b'/') {
                i = j;
                continue;
            }

            // Find the end of the tag, staying clear of a following tag open.
            let mut k = j;
            while k < end && bytes[k] != b'>' && bytes[k] != b'<' {
                k += 1;
            }
            if k >= end || bytes[k] != b'>' {
                i = k;
                continue;
            }

            let self_closing = k > i && bytes[k - 1] == b'/';
            let close_tag = format!("</{name}>");
            let closed_later = text[k..].to_ascii_lowercase().contains(&close_tag);

            if !self_closing && !closed_later {
                issues.push(issue(
                    entry,
                    RuleKind::NonSelfClosingTag,
                    i,
                    k + 1,
                    format!("`<{name}>` is never closed; the renderer requires `<{name} ... />` or a matching close tag"),
                ));
            }
            i = k + 1;
        }
    }
}

/// `\]\[` — escaped brackets where `[text][ref]` was intended.
fn escaped_link_bracket(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    let bytes = text.as_bytes();
    for (start, end) in map.outside_ranges(text.len()) {
        let mut i = start;
        while i + 4 <= end {
            if bytes[i] == b'\\'
                && bytes[i + 1] == b']'
                && bytes[i + 2] == b'\\'
                && bytes[i + 3] == b'['
                && !is_escaped(bytes, i)
            {
                issues.push(issue(
                    entry,
                    RuleKind::EscapedLinkBracket,
                    i,
                    i + 4,
                    "escaped `][` where a reference link `[text][ref]` was intended; the brackets render as literal text",
                ));
                i += 4;
            } else {
                i += 1;
            }
        }
    }
}

/// A `>>>` prompt line outside any fenced block.
fn broken_repl_continuation(
    entry: &str,
    text: &str,
    map: &FenceMap,
    issues: &mut Vec<ValidationIssue>,
) {
    for (line_start, line) in fence::lines_with_offsets(text) {
        let at = line_start + fence::indent_len(line);
        if map.in_fence(at) {
            continue;
        }
        if line.trim_start().starts_with(">>>") {
            issues.push(issue(
                entry,
                RuleKind::BrokenReplContinuation,
                at,
                at + 3,
                "REPL prompt outside a fenced code block; move the transcript into a fenced example",
            ));
        }
    }
}

/// True when the byte at `at` is preceded by an odd number of backslashes.
fn is_escaped(bytes: &[u8], at: usize) -> bool {
    let mut count = 0;
    let mut i = at;
    while i > 0 && bytes[i - 1] == b'\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}
