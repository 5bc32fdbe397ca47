//! Comma-separated uploads → candidate items.
//!
//! The blob is split into lines first; each line is then split into fields
//! by a quote toggle. A `"` anywhere in a field flips quoted mode and is
//! dropped, a doubled `""` inside quotes is a literal quote, and a comma only
//! ends the field outside quotes. Each field is trimmed after splitting, so
//! `x, "a, b"` yields `a, b`. A value never spans a line break.

use std::collections::HashMap;

use gameshelf_common::CandidateItem;
use tracing::debug;

const TITLE_ALIASES: &[&str] = &["title", "name", "game", "game name", "game title"];
const ID_ALIASES: &[&str] = &["bgg_id", "bgg id"];
const URL_ALIASES: &[&str] = &["bgg_url", "bgg url", "url"];

pub type Row = HashMap<String, String>;

/// Parse a header + rows blob into one map per data row.
///
/// Fewer than two non-blank lines yields no rows.
pub fn parse_rows(blob: &str) -> Vec<Row> {
    let lines: Vec<&str> = blob
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return Vec::new();
    }

    let headers: Vec<String> = split_fields(lines[0])
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    lines[1..]
        .iter()
        .map(|line| {
            let mut values = split_fields(line).into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), values.next().unwrap_or_default()))
                .collect()
        })
        .collect()
}

/// Rows with a non-empty title under any alias become candidates, in order.
/// Rows without one are skipped.
pub fn candidates_from_table(blob: &str) -> Vec<CandidateItem> {
    let rows = parse_rows(blob);
    debug!(rows = rows.len(), "Parsed tabular upload");

    rows.iter()
        .filter_map(|row| {
            let title = first_present(row, TITLE_ALIASES)?;
            Some(CandidateItem {
                title,
                bgg_id: first_present(row, ID_ALIASES),
                bgg_url: first_present(row, URL_ALIASES),
            })
        })
        .collect()
}

fn first_present(row: &Row, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Split one line into trimmed field values.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
