//! Per-shape rendering rules for artifact values.
//!
//! Every renderer returns the text of one value. Multi-line sequences put one
//! element per line, indented by `pad`, separated by commas with no comma
//! after the last element. The three "nothing here" cases render differently:
//!
//! - an empty sequence is [`EMPTY_FORM`],
//! - a missing slot inside a sequence is [`NULL_MARKER`],
//! - an absent optional field has no statement at all (handled by the emitter).

use crate::descriptor::NestedSeq;
use crate::hex::Point;
use crate::resource::Resource;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Token for a missing slot
pub const NULL_MARKER: &str = "null";

/// Token for a sequence with no elements
pub const EMPTY_FORM: &str = "[]";

/// Token for an association with no keys
pub const EMPTY_ASSOCIATION: &str = "{}";

/// Join pre-rendered elements into a bracketed, one-per-line block.
fn block(open: char, close: char, items: Vec<String>, pad: &str) -> String {
    if items.is_empty() {
        return format!("{open}{close}");
    }

    let mut out = String::new();
    out.push(open);
    out.push('\n');
    let last = items.len() - 1;
    for (i, item) in items.into_iter().enumerate() {
        out.push_str(pad);
        out.push_str(&item);
        if i != last {
            out.push(',');
        }
        out.push('\n');
    }
    out.push(close);
    out
}

/// Quote a string, escaping anything that would break the literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Integers on one line: `[1, 2, 3]`
pub fn inline_ints(values: &[i32]) -> String {
    let inner: Vec<String> = values.iter().map(i32::to_string).collect();
    format!("[{}]", inner.join(", "))
}

/// Scalar integer sequence
pub fn int_seq(values: &[i32], pad: &str) -> String {
    block('[', ']', values.iter().map(i32::to_string).collect(), pad)
}

/// Coordinate pairs, one `(x, y)` per line
pub fn point_seq(points: &[Point], pad: &str) -> String {
    block('[', ']', points.iter().map(Point::to_string).collect(), pad)
}

fn label_or_null(slot: Option<Resource>) -> String {
    slot.map_or_else(|| NULL_MARKER.to_string(), |r| r.label().to_string())
}

/// Resource labels with nullable slots
pub fn label_seq(labels: &[Option<Resource>], pad: &str) -> String {
    block('[', ']', labels.iter().copied().map(label_or_null).collect(), pad)
}

/// Resource labels without missing slots
pub fn dense_label_seq(labels: &[Resource], pad: &str) -> String {
    block('[', ']', labels.iter().map(|r| r.label().to_string()).collect(), pad)
}

/// Strings with nullable slots
pub fn string_seq(strings: &[Option<String>], pad: &str) -> String {
    let items = strings
        .iter()
        .map(|s| s.as_deref().map_or_else(|| NULL_MARKER.to_string(), quote))
        .collect();
    block('[', ']', items, pad)
}

/// Sequence of integer sequences whose slots may be missing.
///
/// Each slot renders as `null`, `[]` or an inline `[a, b, c]`.
pub fn nested_seq(seq: &NestedSeq, pad: &str) -> String {
    let items = seq
        .iter()
        .map(|slot| match slot {
            None => NULL_MARKER.to_string(),
            Some(inner) => inline_ints(inner),
        })
        .collect();
    block('[', ']', items, pad)
}

/// Sequence of integer sequences with every slot present
pub fn list_seq(seq: &[Vec<i32>], pad: &str) -> String {
    block('[', ']', seq.iter().map(|inner| inline_ints(inner)).collect(), pad)
}

/// Render a keyed association as named bindings plus one association
/// statement.
///
/// Each key gets a binding `let <prefix>_<n> = <sequence>;` where `n` counts
/// up in key order, so binding names never depend on the key text. The
/// association then maps each original key (quoted) to its binding:
///
/// ```text
/// let resource_whitelist_0 = [
///     WOOD
/// ];
/// land_resource_whitelists = {
///     "A": resource_whitelist_0
/// };
/// ```
pub fn association<T>(
    field: &str,
    prefix: &str,
    groups: &BTreeMap<String, Vec<T>>,
    render_values: impl Fn(&[T], &str) -> String,
    pad: &str,
) -> String {
    if groups.is_empty() {
        return format!("{field} = {EMPTY_ASSOCIATION};\n");
    }

    let mut out = String::new();
    let mut entries = Vec::with_capacity(groups.len());

    for (n, (key, values)) in groups.iter().enumerate() {
        let binding = format!("{prefix}_{n}");
        let _ = writeln!(out, "let {binding} = {};", render_values(values, pad));
        entries.push(format!("{}: {binding}", quote(key)));
    }

    let _ = writeln!(out, "{field} = {};", block('{', '}', entries, pad));
    out
}
