//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::MaintenanceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// RFC-9457 Problem Details for admin console errors
#[derive(Debug, Serialize, ToSchema)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Offending input field for validation problems
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            field: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_detail("Authentication credentials were not provided.")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
            .with_detail("You do not have permission to perform this action.")
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: MaintenanceError) -> Problem {
    match error {
        MaintenanceError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource))
                .with_detail(format!("{} with id '{}' was not found", resource, id))
        }

        MaintenanceError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        MaintenanceError::Validation { field, message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                .with_detail(message)
                .with_field(field)
        }

        MaintenanceError::Protected {
            resource,
            id,
            referenced_by,
        } => Problem::new(StatusCode::CONFLICT, "Protected").with_detail(format!(
            "Cannot delete {} '{}' because it is referenced by at least one {}",
            resource, id, referenced_by
        )),

        MaintenanceError::InvalidCredentials => {
            Problem::unauthorized().with_detail(MaintenanceError::InvalidCredentials.to_string())
        }

        MaintenanceError::InactiveAccount => {
            Problem::forbidden().with_detail(MaintenanceError::InactiveAccount.to_string())
        }

        MaintenanceError::Internal => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_maps_to_conflict() {
        let problem = map_domain_error(MaintenanceError::protected(
            "system",
            3,
            "maintenance record",
        ));
        assert_eq!(problem.status, 409);
        assert!(problem
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("maintenance record")));
    }

    #[test]
    fn test_validation_carries_field() {
        let problem = map_domain_error(MaintenanceError::validation("name", "This field is required."));
        assert_eq!(problem.status, 400);
        assert_eq!(problem.field.as_deref(), Some("name"));
    }

    #[test]
    fn test_internal_hides_details() {
        let problem = map_domain_error(MaintenanceError::Internal);
        assert_eq!(problem.status, 500);
        assert_eq!(problem.type_uri, "https://httpstatuses.io/500");
    }
}
