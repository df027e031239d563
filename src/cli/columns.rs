use comfy_table::{Cell, Table};

use txport::column::ALL_COLUMNS;
use txport::error::Result;
use txport::settings::load_settings;

pub fn run() -> Result<()> {
    let mapping = load_settings()?.column_mapping()?;

    let mut table = Table::new();
    table.set_header(vec!["Key", "Default Header", "Reads From"]);
    for column in ALL_COLUMNS {
        table.add_row(vec![
            Cell::new(column.key()),
            Cell::new(column.default_header()),
            Cell::new(mapping.header(*column).unwrap_or("")),
        ]);
    }
    println!("Columns\n{table}");
    Ok(())
}
