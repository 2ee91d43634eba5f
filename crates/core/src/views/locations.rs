use serde::Serialize;

use crate::table::Table;

use super::ReportLayout;

/// Roster rows of one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub location: String,
    pub table: Table,
}

/// Split the roster by location.
///
/// Views come in the order of `locations`, not in order of appearance, and
/// match the location column exactly. A location without rows gets an empty
/// view. Each view drops the location column and is numbered from 1.
pub fn derive_locations(
    roster: &Table,
    locations: &[String],
    layout: &ReportLayout,
) -> Vec<LocationView> {
    let projected = roster.select(&layout.location_columns);
    let location_pos = projected.column_position(&layout.location_column);

    locations
        .iter()
        .map(|location| {
            let mut table = projected.clone();
            table.retain_rows(|_, row| match location_pos {
                Some(pos) => row[pos].as_text() == Some(location.as_str()),
                None => false,
            });

            LocationView {
                location: location.clone(),
                table: table.drop_column(&layout.location_column).with_dense_index(),
            }
        })
        .collect()
}
