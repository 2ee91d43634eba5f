use crate::table::{Cell, RowIndex, Table};

use super::ReportLayout;

/// Count child and staff registrations per location.
///
/// The first row aggregates the whole roster, followed by one row per
/// location in the supplied order. A row counts as child or staff when its
/// category contains the marker (case-sensitive substring).
pub fn derive_summary(roster: &Table, locations: &[String], layout: &ReportLayout) -> Table {
    let summary = &layout.summary;
    let category_pos = roster.column_position(&layout.category_column);
    let location_pos = roster.column_position(&layout.location_column);

    let count = |location: Option<&str>, marker: &str| -> i64 {
        roster
            .rows()
            .iter()
            .filter(|row| match (location, location_pos) {
                (None, _) => true,
                (Some(location), Some(pos)) => row[pos].as_text() == Some(location),
                (Some(_), None) => false,
            })
            .filter(|row| {
                category_pos
                    .and_then(|pos| row[pos].as_text())
                    .is_some_and(|category| category.contains(marker))
            })
            .count() as i64
    };

    let mut table = Table::new(vec![
        summary.child_marker.clone(),
        summary.staff_marker.clone(),
        summary.total_column.clone(),
    ]);
    let mut labels = Vec::with_capacity(locations.len() + 1);

    let rows = std::iter::once((summary.aggregate_label.as_str(), None))
        .chain(locations.iter().map(|l| (l.as_str(), Some(l.as_str()))));
    for (label, location) in rows {
        let children = count(location, &summary.child_marker);
        let staff = count(location, &summary.staff_marker);
        table.push_row(vec![
            Cell::Integer(children),
            Cell::Integer(staff),
            Cell::Integer(children + staff),
        ]);
        labels.push(label.to_string());
    }

    table.with_index(RowIndex::Labels {
        name: summary.index_name.clone(),
        labels,
    })
}
