//! Text-level parsing of Python declarations.
//!
//! Everything here is a deterministic scan over the file text. Comma
//! splitting and paren matching respect nested brackets and string
//! literals so that defaults like `sep=", "` and annotations like
//! `Dict[str, int]` survive intact.

use mx_extract::{Param, Signature, Variadic};

/// Find the closing paren matching the opener at `open`.
///
/// Tracks bracket depth and skips string literals. Returns `None` when the
/// text ends before the paren closes.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_string {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == quote {
                in_string = None;
            }
        } else {
            match b {
                b'"' | b'\'' => in_string = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && b == b')' {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Split a parameter list on top-level commas.
///
/// Nested brackets and string literals never split; empty pieces (from a
/// trailing comma) are dropped.
pub(crate) fn split_params(params: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut chars = params.chars();

    while let Some(c) = chars.next() {
        if let Some(quote) = in_string {
            current.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                in_string = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let piece = current.trim().to_owned();
                if !piece.is_empty() {
                    pieces.push(piece);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let piece = current.trim().to_owned();
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Parse the inner parameter text of a declaration into the closed model.
///
/// Bare `*` and `/` separators are position markers, not parameters, and
/// are dropped. A parameter is optional once it has a default or a
/// variadic marker.
pub(crate) fn parse_params(inner: &str) -> Vec<Param> {
    let mut params = Vec::new();

    for piece in split_params(inner) {
        if piece == "*" || piece == "/" {
            continue;
        }

        let (variadic, rest) = if let Some(rest) = piece.strip_prefix("**") {
            (Variadic::KwArgs, rest)
        } else if let Some(rest) = piece.strip_prefix('*') {
            (Variadic::Args, rest)
        } else {
            (Variadic::None, piece.as_str())
        };

        let (head, default) = split_top_level(rest, '=');
        let (name, ty) = split_top_level(&head, ':');

        let default = default.map(|d| d.trim().to_owned());
        let required = default.is_none() && variadic == Variadic::None;

        params.push(Param {
            name: name.trim().to_owned(),
            ty: ty.map(|t| t.trim().to_owned()),
            default,
            required,
            variadic,
        });
    }

    params
}

/// Split `text` at the first top-level occurrence of `sep`.
fn split_top_level(text: &str, sep: char) -> (String, Option<String>) {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                return (text[..i].to_owned(), Some(text[i + 1..].to_owned()));
            }
            _ => {}
        }
    }
    (text.to_owned(), None)
}

/// Parse a full signature from the text after a declaration's open paren.
///
/// `open` is the offset of the `(`. Returns the signature and the offset
/// just past the `:` terminating the declaration header.
pub(crate) fn parse_signature(text: &str, open: usize) -> Option<(Signature, usize)> {
    let close = matching_paren(text, open)?;
    let params = parse_params(&text[open + 1..close]);

    let (return_type, header_end) = header_colon(text, close + 1)?;

    Some((
        Signature {
            params,
            return_type,
        },
        header_end,
    ))
}

/// Scan to the `:` terminating a declaration header.
///
/// Works for both `def` headers (where the text between the closing paren
/// and the colon is the `->` return annotation) and `class` headers (where
/// there is none). Returns the trimmed annotation, if any, and the offset
/// past the colon. Colons inside brackets (e.g. `Dict[str, int]`) do not
/// terminate.
pub(crate) fn header_colon(text: &str, from: usize) -> Option<(Option<String>, usize)> {
    let rest = &text[from..];
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    for (i, c) in rest.char_indices() {
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let annotation = rest[..i].trim();
                let annotation = annotation
                    .strip_prefix("->")
                    .map(|a| a.trim().to_owned())
                    .filter(|a| !a.is_empty());
                return Some((annotation, from + i + 1));
            }
            _ => {}
        }
    }
    None
}

/// Extract the docstring that follows a declaration header.
///
/// `from` points just past the header's `:`. The rest of that line is
/// ignored; subsequent blank and comment lines are skipped; a triple-quoted
/// string (optionally prefixed `r`/`u`/`b`/`f`) is taken verbatim and
/// dedented. Any other statement means the declaration has no docstring.
pub(crate) fn extract_docstring(text: &str, from: usize) -> Option<String> {
    let rest = &text[from..];
    let mut offset = rest.find('\n').map(|i| i + 1)?;

    loop {
        let line_end = rest[offset..]
            .find('\n')
            .map_or(rest.len(), |i| offset + i + 1);
        let line = rest[offset..line_end].trim();
        if line.is_empty() || line.starts_with('#') {
            if line_end >= rest.len() {
                return None;
            }
            offset = line_end;
            continue;
        }

        let stripped = line.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
        let quote = if stripped.starts_with("\"\"\"") {
            "\"\"\""
        } else if stripped.starts_with("'''") {
            "'''"
        } else {
            return None;
        };

        let body_start =
            offset + (line.len() - stripped.len()) + quote.len() + leading_ws(&rest[offset..]);
        let body = &rest[body_start..];
        let end = body.find(quote)?;
        return Some(cleandoc(&body[..end]));
    }
}

fn leading_ws(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Extract a module-level docstring from the top of a file.
pub(crate) fn module_docstring(text: &str) -> Option<String> {
    let mut offset = 0;
    loop {
        let line_end = text[offset..]
            .find('\n')
            .map_or(text.len(), |i| offset + i + 1);
        let line = text[offset..line_end].trim();
        if line.is_empty() || line.starts_with('#') {
            if line_end >= text.len() {
                return None;
            }
            offset = line_end;
            continue;
        }

        let quote = if line.starts_with("\"\"\"") {
            "\"\"\""
        } else if line.starts_with("'''") {
            "'''"
        } else {
            return None;
        };

        let body_start = offset + leading_ws(&text[offset..line_end]) + quote.len();
        let body = &text[body_start..];
        let end = body.find(quote)?;
        return Some(cleandoc(&body[..end]));
    }
}

/// Dedent a docstring the way `inspect.cleandoc` does.
///
/// The first line loses its leading whitespace; the remaining lines lose
/// the largest indentation they share; leading and trailing blank lines
/// are dropped.
pub(crate) fn cleandoc(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_ws(l))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first() {
        cleaned.push(first.trim_start().to_owned());
        lines.remove(0);
    }
    for line in lines {
        let cut = margin.min(leading_ws(line));
        cleaned.push(line[cut..].trim_end().to_owned());
    }

    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_matching_paren_flat() {
        let text = "def f(a, b):";
        assert_eq!(matching_paren(text, 5), Some(10));
    }

    #[test]
    fn test_matching_paren_nested() {
        let text = "(a: Dict[str, int], b=(1, 2)) -> Array[(None,), Float]";
        assert_eq!(matching_paren(text, 0), Some(28));
    }

    #[test]
    fn test_matching_paren_in_string() {
        let text = "(sep=')')";
        assert_eq!(matching_paren(text, 0), Some(8));
    }

    #[test]
    fn test_matching_paren_unclosed() {
        assert_eq!(matching_paren("(a, b", 0), None);
    }

    #[test]
    fn test_split_params_respects_nesting() {
        assert_eq!(
            split_params("a: Dict[str, int], b: Tuple[int, int] = (1, 2)"),
            vec!["a: Dict[str, int]", "b: Tuple[int, int] = (1, 2)"]
        );
    }

    #[test]
    fn test_split_params_respects_strings() {
        assert_eq!(
            split_params("sep: str = ', ', end: str = '\\n'"),
            vec!["sep: str = ', '", "end: str = '\\n'"]
        );
    }

    #[test]
    fn test_parse_params_full() {
        let params = parse_params("name: str, rows: int = 10, *args, **kwargs");

        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "name");
        assert_eq!(params[0].ty.as_deref(), Some("str"));
        assert!(params[0].required);

        assert_eq!(params[1].default.as_deref(), Some("10"));
        assert!(!params[1].required);

        assert_eq!(params[2].variadic, Variadic::Args);
        assert_eq!(params[2].name, "args");
        assert!(!params[2].required);

        assert_eq!(params[3].variadic, Variadic::KwArgs);
        assert_eq!(params[3].name, "kwargs");
    }

    #[test]
    fn test_parse_params_drops_position_markers() {
        let params = parse_params("a, /, b, *, c");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_params_annotation_with_colon_in_default() {
        let params = parse_params("mapping: Dict[str, int] = {'a': 1}");
        assert_eq!(params[0].ty.as_deref(), Some("Dict[str, int]"));
        assert_eq!(params[0].default.as_deref(), Some("{'a': 1}"));
    }

    #[test]
    fn test_parse_signature_with_return() {
        let text = "def create(name: str, *, rows: int = 0) -> 'Table':\n    pass\n";
        let open = text.find('(').unwrap();
        let (sig, header_end) = parse_signature(text, open).unwrap();

        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.return_type.as_deref(), Some("'Table'"));
        assert_eq!(&text[header_end..header_end + 1], "\n");
    }

    #[test]
    fn test_parse_signature_multiline() {
        let text = "def create(\n    name: str,\n    rows: int = 0,\n) -> Table:\n    pass\n";
        let open = text.find('(').unwrap();
        let (sig, _) = parse_signature(text, open).unwrap();

        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[1].name, "rows");
        assert_eq!(sig.return_type.as_deref(), Some("Table"));
    }

    #[test]
    fn test_parse_signature_bracketed_return() {
        let text = "def pairs() -> Dict[str, int]:\n    pass\n";
        let open = text.find('(').unwrap();
        let (sig, _) = parse_signature(text, open).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("Dict[str, int]"));
    }

    #[test]
    fn test_extract_docstring_basic() {
        let text = "def f():\n    \"\"\"Create a table.\n\n    More detail.\n    \"\"\"\n    pass\n";
        let colon = text.find(':').unwrap();
        let doc = extract_docstring(text, colon + 1).unwrap();
        assert_eq!(doc, "Create a table.\n\nMore detail.");
    }

    #[test]
    fn test_extract_docstring_single_quotes() {
        let text = "def f():\n    '''Short.'''\n";
        let colon = text.find(':').unwrap();
        assert_eq!(extract_docstring(text, colon + 1).unwrap(), "Short.");
    }

    #[test]
    fn test_extract_docstring_none_when_code_first() {
        let text = "def f():\n    return 1\n";
        let colon = text.find(':').unwrap();
        assert_eq!(extract_docstring(text, colon + 1), None);
    }

    #[test]
    fn test_extract_docstring_skips_comment_lines() {
        let text = "def f():\n    # note\n    \"\"\"Doc.\"\"\"\n";
        let colon = text.find(':').unwrap();
        assert_eq!(extract_docstring(text, colon + 1).unwrap(), "Doc.");
    }

    #[test]
    fn test_extract_docstring_raw_prefix() {
        let text = "def f():\n    r\"\"\"Raw \\n doc.\"\"\"\n";
        let colon = text.find(':').unwrap();
        assert_eq!(extract_docstring(text, colon + 1).unwrap(), "Raw \\n doc.");
    }

    #[test]
    fn test_module_docstring() {
        let text = "# comment\n\n\"\"\"Module docs.\n\nDetails.\n\"\"\"\nimport os\n";
        assert_eq!(module_docstring(text).unwrap(), "Module docs.\n\nDetails.");
    }

    #[test]
    fn test_module_docstring_absent() {
        assert_eq!(module_docstring("import os\n"), None);
    }

    #[test]
    fn test_cleandoc_dedents_continuation() {
        let raw = "First line.\n\n        Indented body.\n        More body.\n    ";
        assert_eq!(cleandoc(raw), "First line.\n\nIndented body.\nMore body.");
    }

    #[test]
    fn test_cleandoc_preserves_relative_indent() {
        let raw = "Top.\n    - item\n        - nested\n";
        assert_eq!(cleandoc(raw), "Top.\n- item\n    - nested");
    }

    #[test]
    fn test_cleandoc_empty() {
        assert_eq!(cleandoc(""), "");
        assert_eq!(cleandoc("   \n  \n"), "");
    }
}
