//! In-memory tabular dataset shared by the flattener, the views and the
//! publisher.
//!
//! A [`Table`] is a list of named columns, a list of rows (one [`Cell`] per
//! column) and a [`RowIndex`] describing the leading index column that ends up
//! in column A of the spreadsheet.

use std::fmt;

use serde::Serialize;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
}

impl Cell {
    /// Empty text cell, used for missing values.
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    /// Whether the cell holds an empty string.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Integer(_) => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

/// The index column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowIndex {
    /// Consecutive numbers starting at `start`.
    Range { start: usize },
    /// Explicit row labels under a named index column.
    Labels { name: String, labels: Vec<String> },
}

impl Default for RowIndex {
    fn default() -> Self {
        RowIndex::Range { start: 0 }
    }
}

/// Ordered columns, ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    index: RowIndex,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            index: RowIndex::default(),
        }
    }

    /// Replace the row index.
    pub fn with_index(mut self, index: RowIndex) -> Self {
        self.index = index;
        self
    }

    /// Re-number rows from 1, the way every published roster is indexed.
    pub fn with_dense_index(self) -> Self {
        self.with_index(RowIndex::Range { start: 1 })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// Append a row. Short rows are padded with empty cells, long rows are
    /// truncated to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::empty());
        self.rows.push(row);
    }

    /// Append a column holding `fill` in every existing row.
    pub fn push_column(&mut self, name: impl Into<String>, fill: Cell) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }

    /// Replace the cells of a column, appending the column if it is new.
    /// `values` is padded with empty cells to the row count.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        let pos = match self.column_position(name) {
            Some(pos) => pos,
            None => {
                self.push_column(name, Cell::empty());
                self.columns.len() - 1
            }
        };

        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[pos] = values.next().unwrap_or_default();
        }
    }

    /// Cell at `(row, column name)`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_position(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Text of a cell, or `""` for missing columns and integer cells.
    pub fn text(&self, row: usize, column: &str) -> &str {
        self.cell(row, column)
            .and_then(Cell::as_text)
            .unwrap_or_default()
    }

    /// Label of the `row`-th index entry as displayed in column A.
    pub fn index_label(&self, row: usize) -> String {
        match &self.index {
            RowIndex::Range { start } => (start + row).to_string(),
            RowIndex::Labels { labels, .. } => labels.get(row).cloned().unwrap_or_default(),
        }
    }

    /// Header of the index column (empty for numeric indexes).
    pub fn index_name(&self) -> &str {
        match &self.index {
            RowIndex::Range { .. } => "",
            RowIndex::Labels { name, .. } => name,
        }
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String], &[Cell]) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|row| keep(columns, row));
    }

    /// Rename columns in place. Every column is renamed at most once, so a
    /// target that is also a source is not renamed again. Names not present
    /// are ignored.
    pub fn rename_columns<'a, I>(&mut self, renames: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let renames: Vec<(&str, &str)> = renames.into_iter().collect();
        for column in &mut self.columns {
            if let Some((_, to)) = renames.iter().find(|(from, _)| *from == column.as_str()) {
                *column = to.to_string();
            }
        }
    }

    /// New table with only the listed columns, in the listed order. Columns
    /// that do not exist are skipped.
    pub fn select(&self, wanted: &[String]) -> Table {
        let positions: Vec<(usize, &String)> = wanted
            .iter()
            .filter_map(|name| self.column_position(name).map(|pos| (pos, name)))
            .collect();

        let columns = positions.iter().map(|(_, name)| (*name).clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|(pos, _)| row[*pos].clone()).collect())
            .collect();

        Table {
            columns,
            rows,
            index: self.index.clone(),
        }
    }

    /// New table without the named column.
    pub fn drop_column(&self, name: &str) -> Table {
        let keep: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != name)
            .cloned()
            .collect();
        self.select(&keep)
    }

    /// Mutable access to the cells of one column.
    pub fn column_cells_mut(&mut self, name: &str) -> Option<impl Iterator<Item = &mut Cell>> {
        let pos = self.column_position(name)?;
        Some(self.rows.iter_mut().map(move |row| &mut row[pos]))
    }

    /// Reorder rows by a key extracted from each row. Rows with equal keys
    /// keep their relative order.
    pub fn sort_rows_by_key<K, F>(&mut self, mut key: F)
    where
        K: Ord,
        F: FnMut(&[Cell]) -> K,
    {
        self.rows.sort_by_key(|row| key(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec!["1".into(), "x".into()]);
        table.push_row(vec!["2".into()]);
        table
    }

    #[test]
    fn test_push_row_pads_missing_cells() {
        let table = sample();
        assert_eq!(table.cell(1, "b"), Some(&Cell::empty()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_select_skips_unknown_columns() {
        let table = sample();
        let selected = table.select(&["b".to_string(), "zzz".to_string(), "a".to_string()]);
        assert_eq!(selected.columns(), &["b".to_string(), "a".to_string()]);
        assert_eq!(selected.text(0, "b"), "x");
        assert_eq!(selected.text(0, "a"), "1");
    }

    #[test]
    fn test_rename_ignores_missing() {
        let mut table = sample();
        table.rename_columns([("a", "A"), ("missing", "M")]);
        assert_eq!(table.columns(), &["A".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rename_does_not_chain() {
        let mut table = sample();
        table.rename_columns([("a", "b"), ("b", "c")]);
        assert_eq!(table.columns(), &["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_set_column_replaces_or_appends() {
        let mut table = sample();
        table.set_column("b", vec!["y".into(), "z".into()]);
        assert_eq!(table.text(0, "b"), "y");
        assert_eq!(table.text(1, "b"), "z");

        table.set_column("c", vec![Cell::Integer(1)]);
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.cell(0, "c"), Some(&Cell::Integer(1)));
        assert_eq!(table.cell(1, "c"), Some(&Cell::empty()));
    }

    #[test]
    fn test_index_labels() {
        let table = sample().with_dense_index();
        assert_eq!(table.index_label(0), "1");
        assert_eq!(table.index_label(1), "2");
        assert_eq!(table.index_name(), "");

        let labelled = sample().with_index(RowIndex::Labels {
            name: "Ort".to_string(),
            labels: vec!["X".to_string(), "Y".to_string()],
        });
        assert_eq!(labelled.index_label(1), "Y");
        assert_eq!(labelled.index_name(), "Ort");
    }

    #[test]
    fn test_equality_is_structural() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);

        if let Some(mut cells) = b.column_cells_mut("b") {
            if let Some(first) = cells.next() {
                *first = "changed".into();
            }
        }
        assert_ne!(a, b);
    }

    #[test]
    fn test_integer_cells_display() {
        assert_eq!(Cell::Integer(42).to_string(), "42");
        assert_eq!(Cell::from("abc").to_string(), "abc");
        assert!(Cell::empty().is_empty());
        assert!(!Cell::Integer(0).is_empty());
    }
}
