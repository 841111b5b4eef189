//! Text normalization and field-length policy applied before layout.
//!
//! Upstream extraction tends to produce strings with missing separators
//! ("skills,teamwork", "andDedicated") and irregular spacing. `normalize`
//! repairs those; it is idempotent because the pipeline may apply it twice.

/// Character budget for a single list item (job responsibility).
pub const LIST_ITEM_MAX_CHARS: usize = 150;
/// Character budget for a volunteering entry.
pub const SHORT_ITEM_MAX_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// Regularizes spacing in free text.
///
/// 1. a space is inserted after every comma not already followed by whitespace
/// 2. a space is inserted between a lowercase letter and a following uppercase letter
/// 3. runs of two or more whitespace characters collapse to a single space
/// 4. leading/trailing whitespace is trimmed
pub fn normalize(text: &str) -> String {
    let spaced = space_after_commas(text);
    let split = split_case_joins(&spaced);
    collapse_whitespace_runs(&split).trim().to_string()
}

fn space_after_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == ',' {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}

fn split_case_joins(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if let Some(p) = prev {
            if p.is_lowercase() && c.is_uppercase() {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Replaces each run of 2+ whitespace characters with one space. Lone
/// whitespace characters (including a single newline) are kept as-is.
fn collapse_whitespace_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push(c);
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    match run.chars().count() {
        0 => {}
        1 => out.push_str(run),
        _ => out.push(' '),
    }
    run.clear();
}

/// Collapses all whitespace (including newlines) to single spaces and trims.
/// Used for text drawn as one raw line.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes parenthetical asides, together with the whitespace preceding them.
/// An opening parenthesis without a closing one is left untouched.
pub fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let Some(close_rel) = rest[open..].find(')') else {
            break;
        };
        out.push_str(rest[..open].trim_end());
        rest = &rest[open + close_rel + 1..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Truncates to at most `max_chars` characters, replacing the tail with "..."
/// when the text is too long.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Field-length policy for list items: flatten to one line, drop
/// parenthetical asides, then cap at `LIST_ITEM_MAX_CHARS`.
pub fn prepare_list_item(text: &str) -> String {
    let flat = single_line(text);
    let stripped = strip_parentheticals(&flat);
    truncate_with_ellipsis(&stripped, LIST_ITEM_MAX_CHARS)
}
