//! Super-admin gate in front of the admin console

use super::error::{map_domain_error, Problem};
use crate::api::session::current_principal;
use crate::domain::auth::is_super_admin;
use crate::domain::Service;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Anonymous callers get 401, signed-in callers without super-admin rights 403
pub async fn require_super_admin(
    State(service): State<Arc<Service>>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match current_principal(&service, request.headers()).await {
        Ok(principal) => principal,
        Err(err) => return map_domain_error(err).into_response(),
    };

    match principal {
        None => Problem::unauthorized().into_response(),
        Some(principal) if !is_super_admin(&principal) => {
            tracing::debug!(
                account_id = principal.account.id,
                "admin console access denied"
            );
            Problem::forbidden().into_response()
        }
        Some(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
    }
}
