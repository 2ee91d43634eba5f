use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::flatten::STATUS_COLUMN;
use crate::pretix::OrderStatus;
use crate::table::{Cell, Table};

use super::{ReportLayout, ViewError};

/// Output format of rendered timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Build the sorted roster from the raw table.
pub fn derive_roster(raw: &Table, layout: &ReportLayout, tz: Tz) -> Result<Table, ViewError> {
    let cancelled = OrderStatus::Cancelled;
    let status_pos = raw.column_position(STATUS_COLUMN);

    let mut table = raw.clone();
    table.retain_rows(|_, row| match status_pos {
        Some(pos) => row[pos].as_text() != Some(cancelled.code()),
        None => true,
    });

    table.rename_columns(
        layout
            .renames
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str())),
    );

    merge_phone(&mut table, layout);

    let mut table = table.select(&layout.roster_columns);

    if let Some(cells) = table.column_cells_mut(&layout.timestamp_column) {
        for cell in cells {
            if let Cell::Text(value) = cell {
                *value = format_timestamp(value, tz)?;
            }
        }
    }

    let key_positions: Vec<Option<usize>> = layout
        .sort_keys
        .iter()
        .map(|key| table.column_position(key))
        .collect();
    table.sort_rows_by_key(|row| {
        key_positions
            .iter()
            .map(|pos| pos.map(|p| row[p].to_string()).unwrap_or_default())
            .collect::<Vec<String>>()
    });

    Ok(table.with_dense_index())
}

fn merge_phone(table: &mut Table, layout: &ReportLayout) {
    let merged: Vec<Cell> = (0..table.len())
        .map(|row| {
            layout
                .phone
                .sources
                .iter()
                .map(|source| table.text(row, source))
                .find(|value| !value.is_empty())
                .unwrap_or_default()
                .to_string()
        })
        .map(Cell::Text)
        .collect();

    table.set_column(&layout.phone.target, merged);
}

/// Render a timestamp in `tz`. Values without an offset are taken as UTC.
/// Empty values stay empty.
pub fn format_timestamp(value: &str, tz: Tz) -> Result<String, ViewError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }

    parse_utc(value)
        .map(|dt| dt.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string())
        .ok_or_else(|| ViewError::InvalidTimestamp(value.to_string()))
}

fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RowIndex;

    fn berlin() -> Tz {
        chrono_tz::Europe::Berlin
    }

    fn raw(rows: &[[&str; 6]]) -> Table {
        let mut table = Table::new(
            [
                STATUS_COLUMN,
                "Ich melde mich über folgende Ortschaft an",
                "item_name",
                "attendee_lastname",
                "attendee_firstname",
                "date",
            ]
            .map(String::from)
            .to_vec(),
        );
        for row in rows {
            table.push_row(row.iter().map(|v| Cell::from(*v)).collect());
        }
        table
    }

    #[test]
    fn test_timestamp_rendering() {
        assert_eq!(
            format_timestamp("2024-05-01T10:00:00Z", berlin()).unwrap(),
            "2024-05-01 12:00"
        );
        assert_eq!(
            format_timestamp("2024-01-15T10:30:00.123456+01:00", berlin()).unwrap(),
            "2024-01-15 10:30"
        );
        assert_eq!(
            format_timestamp("2024-01-15 09:30:00", berlin()).unwrap(),
            "2024-01-15 10:30"
        );
        assert_eq!(format_timestamp("", berlin()).unwrap(), "");
        assert!(matches!(
            format_timestamp("yesterday", berlin()),
            Err(ViewError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_cancelled_rows_are_dropped() {
        let table = raw(&[
            ["p", "A", "Jungscharler", "X", "Y", ""],
            ["c", "A", "Jungscharler", "Z", "Z", ""],
            ["n", "A", "Mitarbeiter", "W", "W", ""],
        ]);
        let roster = derive_roster(&table, &ReportLayout::default(), berlin()).unwrap();
        assert_eq!(roster.len(), 2);
        assert!((0..roster.len()).all(|r| roster.text(r, "Nachname") != "Z"));
    }

    #[test]
    fn test_projection_and_order() {
        let table = raw(&[["p", "A", "Jungscharler", "X", "Y", "2024-05-01T10:00:00Z"]]);
        let roster = derive_roster(&table, &ReportLayout::default(), berlin()).unwrap();
        assert_eq!(
            roster.columns(),
            &["Ortschaft", "Art", "Nachname", "Vorname", "Telefonnummer", "Anmeldedatum"]
        );
        assert_eq!(roster.text(0, "Anmeldedatum"), "2024-05-01 12:00");
        assert_eq!(roster.index(), &RowIndex::Range { start: 1 });
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let table = raw(&[
            ["p", "B", "Jungscharler", "Meier", "Anna", "2024-05-02T10:00:00Z"],
            ["p", "A", "Jungscharler", "Meier", "Anna", "2024-05-03T10:00:00Z"],
            ["p", "A", "Jungscharler", "Meier", "Anna", "2024-05-01T10:00:00Z"],
        ]);
        let roster = derive_roster(&table, &ReportLayout::default(), berlin()).unwrap();
        assert_eq!(roster.text(0, "Anmeldedatum"), "2024-05-03 12:00");
        assert_eq!(roster.text(1, "Anmeldedatum"), "2024-05-01 12:00");
        assert_eq!(roster.text(2, "Ortschaft"), "B");
    }

    fn phone_table(parent: &str, staff: &str) -> Table {
        let mut table = Table::new(
            ["Telefonnummer der Eltern", "Telefonnummer"]
                .map(String::from)
                .to_vec(),
        );
        table.push_row(vec![parent.into(), staff.into()]);
        table
    }

    #[test]
    fn test_phone_prefers_parent_number() {
        let layout = ReportLayout::default();
        let roster = derive_roster(&phone_table("0711", "0151"), &layout, berlin()).unwrap();
        assert_eq!(roster.text(0, "Telefonnummer"), "0711");

        let roster = derive_roster(&phone_table("", "0151"), &layout, berlin()).unwrap();
        assert_eq!(roster.text(0, "Telefonnummer"), "0151");

        let roster = derive_roster(&phone_table("", ""), &layout, berlin()).unwrap();
        assert_eq!(roster.text(0, "Telefonnummer"), "");
    }
}
