//! Merging partial updates into stored records.

/// `Some("")` clears an optional text field, `Some(v)` replaces it, `None` keeps `current`.
pub fn merge_text(update: Option<String>, current: Option<String>) -> Option<String> {
    match update {
        Some(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
        None => current,
    }
}

/// Replaces a required text field unless the update is absent or blank.
pub fn merge_required(update: Option<String>, current: String) -> String {
    update
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_text() {
        let current = Some("600".to_string());
        assert_eq!(merge_text(None, current.clone()), current);
        assert_eq!(merge_text(Some("".to_string()), current.clone()), None);
        assert_eq!(
            merge_text(Some(" 700 ".to_string()), current),
            Some("700".to_string())
        );
    }

    #[test]
    fn test_merge_required() {
        assert_eq!(merge_required(None, "Ibuprofeno".to_string()), "Ibuprofeno");
        assert_eq!(
            merge_required(Some("  ".to_string()), "Ibuprofeno".to_string()),
            "Ibuprofeno"
        );
        assert_eq!(
            merge_required(Some("Paracetamol".to_string()), "Ibuprofeno".to_string()),
            "Paracetamol"
        );
    }
}
