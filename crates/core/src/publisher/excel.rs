//! Spreadsheet rendering with rust_xlsxwriter.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Table as SheetTable, TableColumn, TableStyle, Workbook, XlsxError};
use tracing::{error, info, warn};

use crate::table::{Cell, RowIndex, Table};

use super::sanitize::sheet_name;
use super::PublishError;

/// Writes tables as `.xlsx` files into a temporary directory.
#[derive(Debug, Clone)]
pub struct ExcelWriter {
    dir: PathBuf,
    max_column_width: usize,
}

impl ExcelWriter {
    /// Writer using `<system tmp>/<temp_dir_name>`, created if missing.
    pub fn new(temp_dir_name: &str, max_column_width: usize) -> Result<Self, PublishError> {
        Self::in_dir(std::env::temp_dir().join(temp_dir_name), max_column_width)
    }

    /// Writer using an explicit directory, created if missing.
    pub fn in_dir(dir: PathBuf, max_column_width: usize) -> Result<Self, PublishError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_column_width,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `table` to `<dir>/<file_name>` and return the path.
    ///
    /// `file_name` must already be sanitized and carry its extension.
    pub fn write(
        &self,
        table: &Table,
        file_name: &str,
        add_filters: bool,
    ) -> Result<PathBuf, PublishError> {
        let path = self.dir.join(file_name);
        let mut workbook = build_workbook(
            table,
            &sheet_name(file_name),
            self.max_column_width,
            add_filters,
        )?;
        workbook.save(&path)?;

        info!("Created Excel file '{}'.", path.display());
        Ok(path)
    }

    /// Delete a written file. Failures are logged, not returned.
    pub fn remove(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => info!("Deleted temporary Excel file '{}'.", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!("Error deleting file '{}': {}", path.display(), e),
        }
    }
}

/// Build a workbook with one sheet holding `table`.
///
/// The index goes into column A, headers into row 1, both frozen. With
/// `add_filters` the data columns (not the index) become an Excel table
/// with filter buttons and striped rows. Table headers must be unique
/// ignoring case, so clashing headers are written through [`table_headers`].
pub fn build_workbook(
    table: &Table,
    sheet: &str,
    max_column_width: usize,
    add_filters: bool,
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    let bold = Format::new().set_bold();
    let filtered = add_filters && !table.is_empty() && !table.columns().is_empty();
    let headers = if filtered {
        table_headers(table.columns())
    } else {
        table.columns().to_vec()
    };

    if !table.index_name().is_empty() {
        worksheet.write_string_with_format(0, 0, table.index_name(), &bold)?;
    }
    for (col, name) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16 + 1, name, &bold)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_idx as u32 + 1;

        match table.index() {
            RowIndex::Range { start } => {
                worksheet.write_number_with_format(row_num, 0, (start + row_idx) as f64, &bold)?;
            }
            RowIndex::Labels { .. } => {
                worksheet.write_string_with_format(
                    row_num,
                    0,
                    &table.index_label(row_idx),
                    &bold,
                )?;
            }
        }

        for (col, cell) in row.iter().enumerate() {
            let col_num = col as u16 + 1;
            match cell {
                Cell::Text(value) => worksheet.write_string(row_num, col_num, value)?,
                Cell::Integer(value) => worksheet.write_number(row_num, col_num, *value as f64)?,
            };
        }
    }

    worksheet.set_freeze_panes(1, 1)?;

    worksheet.set_column_width(0, index_width(table) as f64)?;
    for (col, width) in column_widths(table, max_column_width).into_iter().enumerate() {
        worksheet.set_column_width(col as u16 + 1, width as f64)?;
    }

    if add_filters {
        if !filtered {
            warn!("Not adding filters to empty sheet '{}'.", sheet);
        } else {
            let columns: Vec<TableColumn> = headers
                .iter()
                .map(|name| TableColumn::new().set_header(name))
                .collect();
            let filter_table = SheetTable::new()
                .set_style(TableStyle::Medium4)
                .set_banded_rows(true)
                .set_columns(&columns);

            worksheet.add_table(
                0,
                1,
                table.len() as u32,
                table.columns().len() as u16,
                &filter_table,
            )?;
        }
    }

    Ok(workbook)
}

/// Header names that are unique ignoring case.
///
/// A name whose lowercase form is already used gets the lowest free
/// ` (#n)` suffix starting at 2. Other names are kept as they are.
pub fn table_headers(columns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .map(|name| {
            let mut header = name.clone();
            let mut counter = 2;
            while !seen.insert(header.to_lowercase()) {
                header = format!("{} (#{})", name, counter);
                counter += 1;
            }
            if header != *name {
                warn!("Table header '{}' written as '{}'.", name, header);
            }
            header
        })
        .collect()
}

/// Width of each data column: the longest header or value plus 2, capped at
/// `max_column_width`.
pub fn column_widths(table: &Table, max_column_width: usize) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let longest = table
                .rows()
                .iter()
                .map(|row| row[col].to_string().chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or_default();
            (longest + 2).min(max_column_width)
        })
        .collect()
}

/// Width of the index column, never capped.
pub fn index_width(table: &Table) -> usize {
    (0..table.len())
        .map(|row| table.index_label(row).chars().count())
        .chain(std::iter::once(table.index_name().chars().count()))
        .max()
        .unwrap_or_default()
        + 2
}
