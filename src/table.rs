use comfy_table::{Cell, Table, presets};

/// A record rendered as one line of a plain-text table
pub trait TableRow {
    /// Column titles, printed upper-cased
    const HEADERS: &'static [&'static str];

    /// Cell values, one per header
    fn cells(&self) -> Vec<&str>;
}

/// Render rows as borderless, left aligned columns under an upper-cased header.
/// Nothing is rendered for an empty slice.
pub fn render<T: TableRow>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(T::HEADERS.iter().map(|h| Cell::new(h.to_uppercase())));
    for row in rows {
        table.add_row(row.cells());
    }
    for column in table.column_iter_mut() {
        column.set_padding((0, 1));
    }

    table
        .lines()
        .map(|line| format!("{}\n", line.trim_end()))
        .collect()
}
