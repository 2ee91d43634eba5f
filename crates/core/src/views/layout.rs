use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column names and markers that shape the published reports.
///
/// Defaults reproduce the teencamp registration reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Raw column name to report column name.
    #[serde(default = "default_renames")]
    pub renames: IndexMap<String, String>,

    #[serde(default)]
    pub phone: PhoneMerge,

    /// Columns of the roster, in order. Absent columns are skipped.
    #[serde(default = "default_roster_columns")]
    pub roster_columns: Vec<String>,

    /// Column rendered as a local timestamp.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    #[serde(default = "default_sort_keys")]
    pub sort_keys: Vec<String>,

    /// Column the location views are split on.
    #[serde(default = "default_location_column")]
    pub location_column: String,

    /// Column holding the ticket category (child or staff).
    #[serde(default = "default_category_column")]
    pub category_column: String,

    /// Columns of each location view before the location column is dropped.
    #[serde(default = "default_location_columns")]
    pub location_columns: Vec<String>,

    #[serde(default)]
    pub summary: SummaryLayout,
}

/// Derived phone column: the first non-empty source wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneMerge {
    #[serde(default = "default_phone_target")]
    pub target: String,
    #[serde(default = "default_phone_sources")]
    pub sources: Vec<String>,
}

/// Labels of the count summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLayout {
    #[serde(default = "default_child_marker")]
    pub child_marker: String,
    #[serde(default = "default_staff_marker")]
    pub staff_marker: String,
    #[serde(default = "default_total_column")]
    pub total_column: String,
    #[serde(default = "default_aggregate_label")]
    pub aggregate_label: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_renames() -> IndexMap<String, String> {
    [
        ("order_code", "Bestellnummer"),
        ("email", "E-Mail"),
        ("date", "Anmeldedatum"),
        ("item_name", "Art"),
        ("attendee_firstname", "Vorname"),
        ("attendee_lastname", "Nachname"),
        ("Essensunverträglichkeiten", "Essensunverträglichkeiten Ja/Nein"),
        ("Welche Unverträglichkeiten?", "Essensunverträglichkeiten"),
        ("Ich melde mich über folgende Ortschaft an", "Ortschaft"),
        ("Ich biete eine Fahrgemeinschaft an", "Fahrer Angebot"),
        ("Ich bin Ortsverantwortlicher.", "Ortsverantwortlicher"),
        ("Telefonnummer", "Telefonnummer Mitarbeiter"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_roster_columns() -> Vec<String> {
    strings(&[
        "Ortschaft",
        "Art",
        "Nachname",
        "Vorname",
        "Telefonnummer",
        "E-Mail",
        "Ernährung",
        "Essensunverträglichkeiten",
        "Sonstiges",
        "Ortsverantwortlicher",
        "Fahrer Angebot",
        "Anmeldedatum",
        "Bestellnummer",
    ])
}

fn default_timestamp_column() -> String {
    "Anmeldedatum".to_string()
}

fn default_sort_keys() -> Vec<String> {
    strings(&["Ortschaft", "Art", "Nachname", "Vorname"])
}

fn default_location_column() -> String {
    "Ortschaft".to_string()
}

fn default_category_column() -> String {
    "Art".to_string()
}

fn default_location_columns() -> Vec<String> {
    strings(&[
        "Ortschaft",
        "Art",
        "Nachname",
        "Vorname",
        "Telefonnummer",
        "E-Mail",
        "Ernährung",
        "Essensunverträglichkeiten",
        "Sonstiges",
        "Fahrer Angebot",
        "Anmeldedatum",
    ])
}

fn default_phone_target() -> String {
    "Telefonnummer".to_string()
}

fn default_phone_sources() -> Vec<String> {
    strings(&["Telefonnummer der Eltern", "Telefonnummer Mitarbeiter"])
}

fn default_child_marker() -> String {
    "Jungscharler".to_string()
}

fn default_staff_marker() -> String {
    "Mitarbeiter".to_string()
}

fn default_total_column() -> String {
    "Gesamt".to_string()
}

fn default_aggregate_label() -> String {
    "GESAMT".to_string()
}

fn default_index_name() -> String {
    "Ortschaft".to_string()
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            renames: default_renames(),
            phone: PhoneMerge::default(),
            roster_columns: default_roster_columns(),
            timestamp_column: default_timestamp_column(),
            sort_keys: default_sort_keys(),
            location_column: default_location_column(),
            category_column: default_category_column(),
            location_columns: default_location_columns(),
            summary: SummaryLayout::default(),
        }
    }
}

impl Default for PhoneMerge {
    fn default() -> Self {
        Self {
            target: default_phone_target(),
            sources: default_phone_sources(),
        }
    }
}

impl Default for SummaryLayout {
    fn default() -> Self {
        Self {
            child_marker: default_child_marker(),
            staff_marker: default_staff_marker(),
            total_column: default_total_column(),
            aggregate_label: default_aggregate_label(),
            index_name: default_index_name(),
        }
    }
}
