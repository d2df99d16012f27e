//! HTML error responses

use super::pages;
use crate::contract::MaintenanceError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Domain error surfaced by an HTML handler
#[derive(Debug)]
pub struct WebError(pub MaintenanceError);

impl From<MaintenanceError> for WebError {
    fn from(error: MaintenanceError) -> Self {
        Self(error)
    }
}

impl WebError {
    pub fn not_found() -> Self {
        Self(MaintenanceError::not_found("page", "requested"))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            MaintenanceError::NotFound { .. } => StatusCode::NOT_FOUND,
            MaintenanceError::Validation { .. } => StatusCode::BAD_REQUEST,
            MaintenanceError::Conflict { .. } | MaintenanceError::Protected { .. } => {
                StatusCode::CONFLICT
            }
            MaintenanceError::InvalidCredentials | MaintenanceError::InactiveAccount => {
                StatusCode::FORBIDDEN
            }
            MaintenanceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match status {
            StatusCode::NOT_FOUND => pages::not_found_page(),
            StatusCode::INTERNAL_SERVER_ERROR => pages::server_error_page(),
            _ => pages::error_page(status, &self.0.to_string()),
        };
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(WebError::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            WebError(MaintenanceError::Internal).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebError(MaintenanceError::protected("system", 1, "maintenance record")).status(),
            StatusCode::CONFLICT
        );
    }
}
