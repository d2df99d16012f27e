//! Authorization gate in front of the HTML views

use super::error::WebError;
use super::WebContext;
use crate::api::session::current_principal;
use crate::domain::auth::is_authorized;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Let active SysAdmins through with their `Principal` attached to the request
///
/// Everyone else is sent to the login view with `next` set to the requested
/// path and query.
pub async fn require_sysadmin(
    State(ctx): State<Arc<WebContext>>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match current_principal(&ctx.service, request.headers()).await {
        Ok(principal) => principal,
        Err(err) => return WebError(err).into_response(),
    };

    match principal {
        Some(principal) if is_authorized(&principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        other => {
            let uri = request.uri();
            let requested = uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| uri.path());
            tracing::debug!(
                path = %requested,
                authenticated = other.is_some(),
                "not a sysadmin, redirecting to login"
            );
            Redirect::to(&ctx.paths.login_with_next(requested)).into_response()
        }
    }
}
