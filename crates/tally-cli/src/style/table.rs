//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

/// Creates a table with a bold header row.
pub fn list_table(columns: &[&str], rows: &[Vec<String>]) -> Table {
    let mut table = styled_table();
    table.set_header(columns.iter().map(|c| header_cell(c)).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row);
    }
    table
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, String)]) -> Table {
    let mut table = styled_table();
    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }
    table
}
