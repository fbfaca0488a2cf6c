use crate::table::{Table, TableError};

/// Sanitize one column header: trim, drop non-ASCII bytes, trim again.
///
/// The export sporadically carries BOM remnants and typographic whitespace
/// in its headers; downstream lookup is verbatim, so headers are folded once
/// at ingest and never touched again.
pub fn sanitize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    let ascii: String = trimmed.chars().filter(char::is_ascii).collect();
    ascii.trim().to_string()
}

/// Apply [`sanitize_header`] to every column of the table.
pub fn sanitize_headers(table: &mut Table) -> Result<(), TableError> {
    table.rename_columns(|c| sanitize_header(c))
}

/// Candidate-state and event-type values compare case-insensitively after
/// trimming; feedback keeps its case and is only trimmed.
pub fn normalize_state(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_event_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_feedback(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn sanitize_header_strips_whitespace_and_non_ascii() {
        assert_eq!(sanitize_header("  Candidate State "), "Candidate State");
        assert_eq!(sanitize_header("\u{feff}ID"), "ID");
        assert_eq!(sanitize_header("Età Range"), "Et Range");
        assert_eq!(sanitize_header(" ✓ "), "");
    }

    #[test]
    fn sanitize_headers_rewrites_table_lookup() {
        let mut table = Table::new(vec![" ID ".into(), "Sector\u{00a0}".into()]).unwrap();
        table
            .push_row(vec![Value::text("a"), Value::text("IT")])
            .unwrap();
        sanitize_headers(&mut table).unwrap();
        assert_eq!(table.columns(), ["ID".to_string(), "Sector".to_string()]);
        assert_eq!(table.value(0, "ID").as_text(), Some("a"));
    }

    #[test]
    fn state_normalization_is_trim_and_lowercase() {
        assert_eq!(normalize_state("  Hired "), "hired");
        assert_eq!(normalize_event_type("Economic Proposal"), "economic proposal");
        assert_eq!(normalize_feedback("  Rejected by Line Manager "), "Rejected by Line Manager");
    }
}
