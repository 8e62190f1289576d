//! Display formatting for extracted signatures.

use mx_extract::{Param, Signature, Variadic};

/// Format a signature for the fenced code block on a page.
///
/// A single parameter stays inline; two or more break one per line with a
/// four-space indent, which keeps long SDK signatures readable in the
/// rendered page. Quoted forward references in annotations lose their
/// quotes for display.
#[must_use]
pub fn format_signature(name: &str, sig: &Signature) -> String {
    let params: Vec<String> = sig.params.iter().map(param_text).collect();
    let ret = sig
        .return_type
        .as_deref()
        .map(|r| format!(" -> {}", strip_type_quotes(r)))
        .unwrap_or_default();

    match params.len() {
        0 => format!("{name}(){ret}"),
        1 => format!("{name}({}){ret}", params[0]),
        _ => format!("{name}(\n    {}\n){ret}", params.join(",\n    ")),
    }
}

fn param_text(param: &Param) -> String {
    let mut text = match param.variadic {
        Variadic::None => param.name.clone(),
        Variadic::Args => format!("*{}", param.name),
        Variadic::KwArgs => format!("**{}", param.name),
    };
    if let Some(ty) = &param.ty {
        text.push_str(": ");
        text.push_str(strip_type_quotes(ty));
    }
    if let Some(default) = &param.default {
        text.push_str(" = ");
        text.push_str(default);
    }
    text
}

/// Drop the quotes around a string-quoted forward reference.
fn strip_type_quotes(ty: &str) -> &str {
    let t = ty.trim();
    if t.len() >= 2
        && ((t.starts_with('\'') && t.ends_with('\'')) || (t.starts_with('"') && t.ends_with('"')))
    {
        &t[1..t.len() - 1]
    } else {
        t
    }
}
