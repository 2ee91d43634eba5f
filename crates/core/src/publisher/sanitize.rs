//! File name cleanup for uploaded reports.

/// Characters replaced before upload, in order.
const REPLACEMENTS: [(&str, &str); 13] = [
    ("\\n", " "),
    ("\\r", " "),
    ("\\t", " "),
    ("<", "_"),
    (">", "_"),
    (":", ""),
    ("\"", ""),
    ("/", "+"),
    ("\\", "_"),
    ("|", "_"),
    ("?", ""),
    ("*", ""),
    ("\0", ""),
];

/// Make `name` safe as a Nextcloud file name.
///
/// Escaped control sequences (a literal backslash followed by `n`, `r` or
/// `t`) become spaces, path separators and reserved characters are replaced
/// or removed.
pub fn sanitize_file_name(name: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(name.trim().to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Sanitized `name` ending in `.{extension}`.
pub fn file_name_with_extension(name: &str, extension: &str) -> String {
    let name = sanitize_file_name(name);
    let suffix = format!(".{}", extension);
    if name.to_lowercase().ends_with(&suffix.to_lowercase()) {
        name
    } else {
        name + &suffix
    }
}

/// Worksheet name for a file: the stem, limited to the 31 characters Excel
/// allows, without the brackets Excel rejects.
pub fn sheet_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    let name: String = stem
        .chars()
        .map(|c| if c == '[' || c == ']' { '_' } else { c })
        .take(31)
        .collect();

    if name.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replacements() {
        assert_eq!(sanitize_file_name("  Raw_Data  "), "Raw_Data");
        assert_eq!(sanitize_file_name("A/B"), "A+B");
        assert_eq!(sanitize_file_name("a<b>c"), "a_b_c");
        assert_eq!(sanitize_file_name("x:\"y\"?*"), "xy");
        assert_eq!(sanitize_file_name("back\\slash|pipe"), "back_slash_pipe");
        assert_eq!(sanitize_file_name("line\\nbreak"), "line break");
    }

    #[test]
    fn test_extension_appended_once() {
        assert_eq!(file_name_with_extension("Alle", "xlsx"), "Alle.xlsx");
        assert_eq!(file_name_with_extension("Alle.xlsx", "xlsx"), "Alle.xlsx");
        assert_eq!(file_name_with_extension("Stand.TXT", "txt"), "Stand.TXT");
        assert_eq!(
            file_name_with_extension("Bad Boll/Zell", "xlsx"),
            "Bad Boll+Zell.xlsx"
        );
    }

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name("Alle.xlsx"), "Alle");
        assert_eq!(sheet_name("[Ort].xlsx"), "_Ort_");
        assert_eq!(
            sheet_name("Ein sehr langer Ortsname mit vielen Zeichen.xlsx"),
            "Ein sehr langer Ortsname mit vi"
        );
        assert_eq!(sheet_name(".xlsx"), ".xlsx");
        assert_eq!(sheet_name(""), "Sheet1");
    }
}
