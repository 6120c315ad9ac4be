// Older client versions emit abbreviated level names, merge them so dashboards
// show one series per level. Unrecognized labels pass through and chart as
// their own series, they are not an error.
pub fn canonicalize(label: &str) -> &str {
    match label {
        "WARN" => "WARNING",
        "ERR." => "ERROR",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::canonicalize;

    #[test]
    fn merges_known_synonyms() {
        assert_eq!(canonicalize("WARN"), "WARNING");
        assert_eq!(canonicalize("ERR."), "ERROR");
    }

    #[test]
    fn passes_through_everything_else() {
        assert_eq!(canonicalize("INFO"), "INFO");
        assert_eq!(canonicalize("DEBUG"), "DEBUG");
        assert_eq!(canonicalize("warn"), "warn"); // table is exact match, no case folding
        assert_eq!(canonicalize("AUDIT"), "AUDIT");
    }

    #[test]
    fn idempotent() {
        for label in ["WARN", "ERR.", "WARNING", "ERROR", "INFO", "whatever"] {
            assert_eq!(canonicalize(canonicalize(label)), canonicalize(label), "label={label}");
        }
    }
}
