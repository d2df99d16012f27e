//! Domain service - business logic orchestration
//!
//! Split by area: accounts and sessions, the catalog of dimensions
//! (systems, hardware, software, maintenance types, sysadmins) and the
//! maintenance/documentation records with their relationships.

mod accounts;
mod catalog;
mod records;

use super::markup;
use super::repository::{Repositories, UniqueViolation};
use super::validation::validate_markup_type;
use crate::contract::{MaintenanceError, MarkupInput, MarkupText};
use std::time::Duration;

/// Domain service for system maintenance tracking
pub struct Service {
    repos: Repositories,
    session_ttl: Duration,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, session_ttl: Duration) -> Self {
        Self { repos, session_ttl }
    }
}

/// Map a repository error, logging anything that is not a unique violation
fn storage(operation: &'static str) -> impl Fn(anyhow::Error) -> MaintenanceError {
    move |err| {
        if let Some(violation) = err.downcast_ref::<UniqueViolation>() {
            return MaintenanceError::conflict(violation.to_string());
        }
        tracing::error!(operation, error = %format!("{:#}", err), "storage failure");
        MaintenanceError::Internal
    }
}

/// Validate the declared type and render the raw source into the shadow column
fn render_markup(field: &str, input: &MarkupInput) -> Result<MarkupText, MaintenanceError> {
    validate_markup_type(field, &input.markup_type)?;
    Ok(MarkupText {
        raw: input.raw.clone(),
        markup_type: input.markup_type.clone(),
        rendered: markup::render_labeled(&input.raw, &input.markup_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MarkupType;

    #[test]
    fn test_render_markup_fills_shadow_column() {
        let text = render_markup("description", &MarkupInput::new("**bold**", MarkupType::Markdown))
            .unwrap();
        assert_eq!(text.raw, "**bold**");
        assert_eq!(text.markup_type, "Markdown");
        assert!(text.rendered.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_markup_rejects_unknown_type() {
        let input = MarkupInput {
            raw: "x".to_string(),
            markup_type: "Textile".to_string(),
        };
        assert!(matches!(
            render_markup("problems", &input),
            Err(MaintenanceError::Validation { ref field, .. }) if field == "problems_markup_type"
        ));
    }

    #[test]
    fn test_storage_maps_unique_violation_to_conflict() {
        let err = anyhow::Error::new(UniqueViolation("duplicate name".to_string()));
        assert_eq!(
            storage("test")(err),
            MaintenanceError::conflict("duplicate name")
        );
        assert_eq!(
            storage("test")(anyhow::anyhow!("disk full")),
            MaintenanceError::Internal
        );
    }
}
