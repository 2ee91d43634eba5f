//! Extraction of human-readable answer options from question details.
//!
//! The question detail endpoint is loosely typed: depending on the pretix
//! version and plugins, options live under different keys and each option may
//! be a plain string, a record with a label field, or a record whose label is
//! itself a language map.

use serde_json::{Map, Value};

/// Keys that may hold the option list, in lookup order.
pub const OPTION_LIST_KEYS: &[&str] = &[
    "options",
    "choices",
    "answers",
    "options_list",
    "question_options",
];

/// Keys that may hold an option's label, in lookup order.
pub const LABEL_KEYS: &[&str] = &["label", "text", "answer", "name", "title", "display"];

/// Languages tried inside a language map, in lookup order.
pub const LABEL_LANGUAGES: &[&str] = &["de", "de-DE", "en", "en-US"];

/// Locate the option entries of a question detail record.
pub fn option_entries(detail: &Value) -> &[Value] {
    let Some(record) = detail.as_object() else {
        return &[];
    };

    let known = OPTION_LIST_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array));
    if let Some(list) = known.filter(|list| !list.is_empty()) {
        return list;
    }

    // Any non-empty list whose first entry looks like an option.
    record
        .values()
        .find_map(|value| match value {
            Value::Array(list)
                if list
                    .first()
                    .is_some_and(|first| first.is_string() || first.is_object()) =>
            {
                Some(list.as_slice())
            }
            _ => None,
        })
        .unwrap_or(&[])
}

/// Human-readable label of a single option entry.
pub fn extract_label(option: &Value) -> Option<String> {
    match option {
        Value::String(s) => non_empty(s),
        Value::Object(record) => labelled_field(record).or_else(|| first_string_field(record)),
        _ => None,
    }
}

/// Labels of every option of a question detail record, in entry order.
pub fn extract_labels(detail: &Value) -> Vec<String> {
    option_entries(detail)
        .iter()
        .filter_map(extract_label)
        .collect()
}

fn labelled_field(record: &Map<String, Value>) -> Option<String> {
    LABEL_KEYS.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) => non_empty(s),
        Some(Value::Object(translations)) => translated(translations),
        _ => None,
    })
}

fn translated(translations: &Map<String, Value>) -> Option<String> {
    LABEL_LANGUAGES
        .iter()
        .find_map(|lang| translations.get(*lang).and_then(Value::as_str).and_then(non_empty))
        .or_else(|| first_string_field(translations))
}

fn first_string_field(record: &Map<String, Value>) -> Option<String> {
    record
        .values()
        .find_map(|value| value.as_str().and_then(non_empty))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_option_is_trimmed() {
        assert_eq!(extract_label(&json!("  Musterstadt ")), Some("Musterstadt".into()));
        assert_eq!(extract_label(&json!("   ")), None);
    }

    #[test]
    fn test_known_keys_in_order() {
        let option = json!({"name": "by-name", "label": "by-label"});
        assert_eq!(extract_label(&option), Some("by-label".into()));

        let option = json!({"label": "", "title": "by-title"});
        assert_eq!(extract_label(&option), Some("by-title".into()));
    }

    #[test]
    fn test_language_map_prefers_german_then_english() {
        let option = json!({"answer": {"en": "Town", "de": "Ort"}});
        assert_eq!(extract_label(&option), Some("Ort".into()));

        let option = json!({"answer": {"fr": "Ville", "en-US": "Town"}});
        assert_eq!(extract_label(&option), Some("Town".into()));

        let option = json!({"answer": {"fr": "Ville"}});
        assert_eq!(extract_label(&option), Some("Ville".into()));
    }

    #[test]
    fn test_falls_back_to_first_string_field() {
        let option = json!({"id": 3, "identifier": "XYZ", "position": 0});
        assert_eq!(extract_label(&option), Some("XYZ".into()));
        assert_eq!(extract_label(&json!({"id": 1})), None);
        assert_eq!(extract_label(&json!(42)), None);
    }

    #[test]
    fn test_option_entries_known_key() {
        let detail = json!({
            "id": 1,
            "dependency_values": ["ignored"],
            "options": [{"answer": {"de": "A"}}, {"answer": {"de": "B"}}]
        });
        assert_eq!(extract_labels(&detail), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_option_entries_fallback_list() {
        let detail = json!({"id": 1, "empty": [], "numbers": [1, 2], "things": ["X", "Y"]});
        assert_eq!(extract_labels(&detail), vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_option_entries_non_object() {
        assert!(option_entries(&json!(["a"])).is_empty());
    }
}
