//! Input validation, run before anything reaches the store

use crate::contract::{MaintenanceError, MarkupType};

/// Maximum length of names, titles and labels
pub const MAX_NAME_LENGTH: usize = 255;

/// Validate a required short text field (name, title, label, username)
///
/// Returns the value with surrounding whitespace removed.
pub fn validate_name(field: &str, value: &str) -> Result<String, MaintenanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MaintenanceError::validation(field, "This field is required."));
    }
    let length = trimmed.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(MaintenanceError::validation(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_NAME_LENGTH, length
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a username: a name that only holds letters, digits and `@.+-_`
pub fn validate_username(value: &str) -> Result<String, MaintenanceError> {
    let username = validate_name("username", value)?;
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(MaintenanceError::validation(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(username)
}

pub fn validate_password(value: &str) -> Result<(), MaintenanceError> {
    if value.is_empty() {
        return Err(MaintenanceError::validation("password", "This field is required."));
    }
    Ok(())
}

/// Validate a markup type label; empty means "no markup" and is accepted
pub fn validate_markup_type(field: &str, label: &str) -> Result<(), MaintenanceError> {
    if label.is_empty() || MarkupType::from_label(label).is_some() {
        return Ok(());
    }
    let choices = MarkupType::ALL
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ");
    Err(MaintenanceError::validation(
        &format!("{}_markup_type", field),
        format!(
            "Select a valid choice. {} is not one of the available choices ({}).",
            label, choices
        ),
    ))
}

/// A relationship edge may not point a record at itself
pub fn validate_relationship(
    referencing_record_id: i32,
    referenced_record_id: i32,
) -> Result<(), MaintenanceError> {
    if referencing_record_id == referenced_record_id {
        return Err(MaintenanceError::validation(
            "__all__",
            "A record cannot be related to itself.",
        ));
    }
    Ok(())
}

/// Deduplicate ids while keeping the submitted order
pub fn unique_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("name", "  web01 ").ok(), Some("web01".to_string()));
    }

    #[test]
    fn test_validate_name_required() {
        let err = validate_name("name", "   ");
        assert!(matches!(
            err,
            Err(MaintenanceError::Validation { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_validate_name_max_length() {
        assert!(validate_name("name", &"a".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name("name", &"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("first.last+ops@example").is_ok());
        assert!(validate_username("with space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_markup_type() {
        assert!(validate_markup_type("description", "Markdown").is_ok());
        assert!(validate_markup_type("description", "reStructuredText").is_ok());
        assert!(validate_markup_type("description", "").is_ok());

        let err = validate_markup_type("description", "Textile");
        assert!(matches!(
            err,
            Err(MaintenanceError::Validation { ref field, .. }) if field == "description_markup_type"
        ));
    }

    #[test]
    fn test_self_relationship_rejected() {
        assert!(validate_relationship(1, 1).is_err());
        assert!(validate_relationship(1, 2).is_ok());
    }

    #[test]
    fn test_unique_ids_keeps_order() {
        assert_eq!(unique_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
