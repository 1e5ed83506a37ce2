use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::error::{Error, Result};
use crate::reports::SeriesTable;

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> Error + '_ {
    move |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error(path))?;
    for r in rows {
        wtr.serialize(r).map_err(csv_error(path))?;
    }
    wtr.flush().map_err(io_error(path))?;
    Ok(())
}

pub fn write_table_csv(path: &Path, table: &SeriesTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error(path))?;
    wtr.write_record(&table.headers).map_err(csv_error(path))?;
    for row in &table.rows {
        wtr.write_record(row).map_err(csv_error(path))?;
    }
    wtr.flush().map_err(io_error(path))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(io_error(path))?;
    Ok(())
}

pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn render_series_table(table: &SeriesTable) -> String {
    if table.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_rows(rows, max_rows));
}

pub fn preview_series_table(table: &SeriesTable) {
    println!("{}\n", render_series_table(table));
}
