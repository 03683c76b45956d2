//! Tabular output.

use comfy_table::{Row, Table};

/// Build a borderless table with an upper-case header row
pub(crate) fn table<I>(headers: &[&str], rows: I) -> Table
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table.set_header(Row::from(headers.iter().map(|h| h.to_uppercase())));
    for row in rows {
        table.add_row(Row::from(row));
    }
    table.load_preset(comfy_table::presets::NOTHING);
    table
}

pub(crate) fn print_table<I>(headers: &[&str], rows: I)
where
    I: IntoIterator<Item = Vec<String>>,
{
    println!("{}", table(headers, rows));
}
