//! Report derivation from a realistic event.
//!
//! Flattens the fixture event and checks the roster, the location views and
//! the summary as they would be published.

use p2n_core::{
    flatten::{flatten, item_index, question_index},
    pretix::ItemRef,
    table::{Cell, RowIndex, Table},
    testing::fixtures,
    views::{derive_reports, ReportLayout, ReportSet},
};

fn locations() -> Vec<String> {
    ["Beispielhausen", "Leerdorf", "Musterstadt"]
        .map(String::from)
        .to_vec()
}

fn raw_table() -> Table {
    flatten(
        &fixtures::teencamp_orders(),
        &question_index(&fixtures::teencamp_questions()),
        &item_index(&fixtures::teencamp_items()),
    )
}

fn reports() -> ReportSet {
    derive_reports(
        &raw_table(),
        &locations(),
        &ReportLayout::default(),
        chrono_tz::Europe::Berlin,
    )
    .unwrap()
}

fn column(table: &Table, name: &str) -> Vec<String> {
    (0..table.len())
        .map(|row| table.text(row, name).to_string())
        .collect()
}

#[test]
fn test_raw_table_shape() {
    let raw = raw_table();

    assert_eq!(raw.len(), 6);
    assert_eq!(raw.columns().len(), 18 + 3);
    assert_eq!(raw.columns()[0], "order_code");
    assert_eq!(raw.columns()[18], fixtures::LOCATION_QUESTION);
    assert_eq!(raw.cell(0, "position_id"), Some(&Cell::Integer(1)));
    assert_eq!(raw.text(3, "item_name"), "Mitarbeiter");
}

#[test]
fn test_roster_is_sorted_and_renamed() {
    let roster = reports().roster;

    assert_eq!(roster.columns()[0], "Ortschaft");
    assert!(!roster.has_column("Ernährung"));
    assert_eq!(
        column(&roster, "Nachname"),
        vec!["Fremd", "Beispiel", "Mustermann", "Mustermann", "Leiter", "Leiterin"]
    );
    assert_eq!(
        column(&roster, "Vorname"),
        vec!["Lena", "Paul", "Erika", "Max", "Ben", "Anna"]
    );
    assert_eq!(
        roster.index(),
        &RowIndex::Range { start: 1 },
        "roster is numbered from 1"
    );
}

#[test]
fn test_roster_merges_phone_numbers() {
    let roster = reports().roster;

    let phones = column(&roster, "Telefonnummer");
    assert_eq!(&phones[..4], &["0711 123"; 4]);
    assert_eq!(&phones[4..], &["0170 456"; 2]);
}

#[test]
fn test_roster_timestamps_are_local() {
    let roster = reports().roster;

    // 09:30 UTC is 10:30 in Berlin in March
    let max = (0..roster.len())
        .find(|&row| roster.text(row, "Vorname") == "Max")
        .unwrap();
    assert_eq!(roster.text(max, "Anmeldedatum"), "2025-03-01 10:30");
}

#[test]
fn test_location_views() {
    let views = reports().locations;

    let names: Vec<&str> = views.iter().map(|v| v.location.as_str()).collect();
    assert_eq!(names, vec!["Beispielhausen", "Leerdorf", "Musterstadt"]);

    let musterstadt = &views[2].table;
    assert_eq!(musterstadt.len(), 5);
    assert!(!musterstadt.has_column("Ortschaft"));
    assert!(!musterstadt.has_column("Bestellnummer"));
    assert_eq!(musterstadt.columns()[0], "Art");

    let leerdorf = &views[1].table;
    assert!(leerdorf.is_empty());
    assert_eq!(leerdorf.columns(), musterstadt.columns());
}

#[test]
fn test_summary_counts() {
    let summary = reports().summary;

    assert_eq!(summary.columns(), ["Jungscharler", "Mitarbeiter", "Gesamt"]);
    assert_eq!(summary.index_name(), "Ortschaft");

    let expected = [
        ("GESAMT", [4, 2, 6]),
        ("Beispielhausen", [1, 0, 1]),
        ("Leerdorf", [0, 0, 0]),
        ("Musterstadt", [3, 2, 5]),
    ];
    for (row, (label, counts)) in expected.iter().enumerate() {
        assert_eq!(summary.index_label(row), *label);
        let cells: Vec<Cell> = counts.iter().map(|c| Cell::Integer(*c)).collect();
        assert_eq!(summary.rows()[row], cells, "{}", label);
    }
}

#[test]
fn test_unknown_item_gets_placeholder_name() {
    let mut orders = fixtures::teencamp_orders();
    orders[0].positions[0].item = ItemRef::Id(42);

    let raw = flatten(
        &orders,
        &question_index(&fixtures::teencamp_questions()),
        &item_index(&fixtures::teencamp_items()),
    );
    assert_eq!(raw.text(0, "item_name"), "Item 42");
    assert_eq!(raw.cell(0, "item_id"), Some(&Cell::Integer(42)));
}

#[test]
fn test_invalid_timestamp_fails_derivation() {
    let mut orders = fixtures::teencamp_orders();
    orders[1].datetime = "gestern".to_string();

    let raw = flatten(
        &orders,
        &question_index(&fixtures::teencamp_questions()),
        &item_index(&fixtures::teencamp_items()),
    );
    let result = derive_reports(
        &raw,
        &locations(),
        &ReportLayout::default(),
        chrono_tz::Europe::Berlin,
    );
    assert!(result.is_err());
}
