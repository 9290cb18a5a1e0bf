//! Event CSV rendering
//!
//! Deterministic for a given row sequence:
//!
//! 1. columns are the union of row keys in first-seen order
//! 2. columns are regrouped by the preference's prefix order
//! 3. the non-preferred navigation source's positional columns are dropped
//! 4. `id` moves to the last column and `ts` is shown as `Date/Time (UTC)`
//!
//! The header row is unquoted. Every cell is quoted JSON-string style, so a
//! row without a column renders `""`.

use serde_json::Value;

use super::{FlattenedRow, NavPreference};

pub const TIMESTAMP_COLUMN: &str = "ts";
pub const TIMESTAMP_LABEL: &str = "Date/Time (UTC)";
pub const ID_COLUMN: &str = "id";

pub fn to_csv(rows: &[FlattenedRow], nav: NavPreference) -> String {
    let columns = column_order(rows, nav);

    let header = columns
        .iter()
        .map(|column| {
            if *column == TIMESTAMP_COLUMN {
                TIMESTAMP_LABEL
            } else {
                column
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| quote(row.get(column).unwrap_or("")))
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

/// Final column sequence, before the timestamp rename.
pub fn column_order(rows: &[FlattenedRow], nav: NavPreference) -> Vec<&str> {
    let mut remaining: Vec<&str> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !remaining.contains(&column) {
                remaining.push(column);
            }
        }
    }

    let mut ordered = Vec::with_capacity(remaining.len());
    for prefix in nav.prefix_order() {
        let (matching, rest): (Vec<&str>, Vec<&str>) =
            remaining.into_iter().partition(|column| column.starts_with(prefix));
        ordered.extend(matching);
        remaining = rest;
    }
    ordered.extend(remaining);

    ordered.retain(|column| !nav.excludes(column));

    if let Some(index) = ordered.iter().position(|column| *column == ID_COLUMN) {
        let id = ordered.remove(index);
        ordered.push(id);
    }

    ordered
}

fn quote(cell: &str) -> String {
    Value::String(cell.to_string()).to_string()
}
