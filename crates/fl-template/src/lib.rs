// SPDX-License-Identifier: MIT OR Apache-2.0
//! Escape-aware message-template interpolation.
//!
//! Templates carry `{...}` placeholders resolved against an ordered
//! [`Argument`] list: an exact name match wins, a non-negative integer falls
//! back to positional lookup, and anything else stays verbatim.  `\{` and
//! `\}` escape literal braces.  [`interpolate`] is pure and never panics —
//! unresolvable input degrades to leaving the placeholder untouched.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use fl_problem::Argument;
use serde_json::Value;

/// Render an argument value as placeholder text.
///
/// Strings render unquoted, `null` renders as the literal `null`, and every
/// other JSON value renders as compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve every placeholder in `template` against `arguments`.
///
/// Resolution per placeholder `{v}`:
/// 1. the first argument named exactly `v`;
/// 2. else, `v` parsed as a non-negative index into `arguments`;
/// 3. else, the placeholder (braces included) stays verbatim.
///
/// A `{` preceded by an odd run of backslashes is escaped and not treated as
/// a placeholder opener.  After resolution a single unescape pass rewrites
/// `\{` and `\}` to bare braces; substituted text is never rescanned.
///
/// With an empty argument list the template passes through with only the
/// unescape pass applied.
#[must_use]
pub fn interpolate(template: &str, arguments: &[Argument]) -> String {
    if arguments.is_empty() {
        return unescape(template);
    }
    unescape(&resolve(template, arguments))
}

/// Substitution pass: emits literals as-is and replaces resolvable spans.
fn resolve(template: &str, arguments: &[Argument]) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '{' && !is_escaped(&chars, i) {
            // The first `}` closes the span; placeholders do not nest.
            match chars[i + 1..].iter().position(|&c| c == '}') {
                Some(offset) => {
                    let close = i + 1 + offset;
                    let inner: String = chars[i + 1..close].iter().collect();
                    match lookup(&inner, arguments) {
                        Some(text) => out.push_str(&text),
                        None => {
                            out.push('{');
                            out.push_str(&inner);
                            out.push('}');
                        }
                    }
                    i = close + 1;
                }
                None => {
                    // Unterminated span: the rest of the template is literal.
                    out.extend(&chars[i..]);
                    i = chars.len();
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Whether the character at `pos` sits behind an odd run of backslashes.
fn is_escaped(chars: &[char], pos: usize) -> bool {
    let mut backslashes = 0;
    while backslashes < pos && chars[pos - 1 - backslashes] == '\\' {
        backslashes += 1;
    }
    backslashes % 2 == 1
}

/// Resolve one placeholder's inner text, name first, then position.
fn lookup(inner: &str, arguments: &[Argument]) -> Option<String> {
    if let Some(named) = arguments.iter().find(|a| a.name == inner) {
        return Some(render_value(&named.value));
    }
    if let Ok(index) = inner.parse::<usize>() {
        if let Some(positional) = arguments.get(index) {
            return Some(render_value(&positional.value));
        }
    }
    None
}

/// Rewrite `\{` and `\}` to bare braces in a single left-to-right pass.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('{') | Some('}')) {
            // Skip the backslash; the brace itself is pushed below.
            continue;
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> Vec<Argument> {
        pairs
            .iter()
            .map(|(n, v)| Argument::from_value(*n, v.clone()))
            .collect()
    }

    // -- Named resolution ------------------------------------------------

    #[test]
    fn named_placeholders_resolve() {
        let out = interpolate(
            "Value must be between {min} and {max}",
            &args(&[("min", json!(1)), ("max", json!(10))]),
        );
        assert_eq!(out, "Value must be between 1 and 10");
    }

    #[test]
    fn first_named_match_wins_on_duplicates() {
        let out = interpolate("{n}", &args(&[("n", json!("a")), ("n", json!("b"))]));
        assert_eq!(out, "a");
    }

    #[test]
    fn name_match_beats_positional_parse() {
        // An argument literally named "0" shadows index-based lookup.
        let out = interpolate(
            "{0}",
            &args(&[("first", json!("positional")), ("0", json!("named"))]),
        );
        assert_eq!(out, "named");
    }

    // -- Positional fallback ---------------------------------------------

    #[test]
    fn positional_fallback_when_name_misses() {
        let out = interpolate("{0} then {1}", &args(&[("x", json!("v")), ("y", json!(2))]));
        assert_eq!(out, "v then 2");
    }

    #[test]
    fn out_of_range_index_stays_verbatim() {
        let out = interpolate("{5}", &args(&[("x", json!("v"))]));
        assert_eq!(out, "{5}");
    }

    #[test]
    fn negative_index_is_not_positional() {
        let out = interpolate("{-1}", &args(&[("x", json!("v"))]));
        assert_eq!(out, "{-1}");
    }

    // -- Unresolved / degenerate ------------------------------------------

    #[test]
    fn unresolved_placeholder_left_intact() {
        assert_eq!(interpolate("{missing}", &[]), "{missing}");
    }

    #[test]
    fn empty_arguments_only_unescape() {
        assert_eq!(interpolate("plain text", &[]), "plain text");
        assert_eq!(interpolate(r"escaped \{brace\}", &[]), "escaped {brace}");
    }

    #[test]
    fn no_placeholder_input_is_unchanged() {
        let out = interpolate("nothing to do", &args(&[("n", json!(1))]));
        assert_eq!(out, "nothing to do");
    }

    #[test]
    fn empty_placeholder_stays_verbatim() {
        let out = interpolate("{}", &args(&[("n", json!(1))]));
        assert_eq!(out, "{}");
    }

    #[test]
    fn unterminated_span_is_literal() {
        let out = interpolate("tail {n is open", &args(&[("n", json!(1))]));
        assert_eq!(out, "tail {n is open");
    }

    // -- Escapes ----------------------------------------------------------

    #[test]
    fn escaped_brace_prevents_substitution() {
        let out = interpolate(r"\{name}", &args(&[("name", json!("v"))]));
        assert_eq!(out, "{name}");
    }

    #[test]
    fn double_backslash_does_not_escape() {
        // The second backslash is itself escaped, so `{name}` resolves.
        let out = interpolate(r"\\{name}", &args(&[("name", json!("v"))]));
        assert_eq!(out, r"\\v");
    }

    #[test]
    fn escaped_closing_brace_unescapes() {
        assert_eq!(interpolate(r"a\}b", &args(&[("n", json!(1))])), "a}b");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let out = interpolate("{outer}", &args(&[("outer", json!("{inner}")), ("inner", json!("x"))]));
        assert_eq!(out, "{inner}");
    }

    // -- Value rendering ---------------------------------------------------

    #[test]
    fn null_value_renders_as_literal_null() {
        let out = interpolate("got {v}", &args(&[("v", Value::Null)]));
        assert_eq!(out, "got null");
    }

    #[test]
    fn string_value_renders_unquoted() {
        let out = interpolate("hello {who}", &args(&[("who", json!("world"))]));
        assert_eq!(out, "hello world");
    }

    #[test]
    fn structured_value_renders_as_compact_json() {
        let out = interpolate("{v}", &args(&[("v", json!({"a": 1}))]));
        assert_eq!(out, r#"{"a":1}"#);
    }

    #[test]
    fn render_value_rules() {
        assert_eq!(render_value(&Value::Null), "null");
        assert_eq!(render_value(&json!("s")), "s");
        assert_eq!(render_value(&json!(3.5)), "3.5");
        assert_eq!(render_value(&json!([1, 2])), "[1,2]");
        assert_eq!(render_value(&json!(true)), "true");
    }
}
