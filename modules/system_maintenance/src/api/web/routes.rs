//! Route registration for the HTML views

use super::{guard::require_sysadmin, handlers, WebContext};
use axum::{middleware, routing::get, Extension, Router};
use std::sync::Arc;

/// HTML routes below the configured mount path
///
/// Everything except login and logout sits behind the SysAdmin gate.
pub fn router(ctx: Arc<WebContext>) -> Router {
    let paths = &ctx.paths;

    let gated = Router::new()
        .route(&paths.home(), get(handlers::home))
        .route(&paths.documentation_list(), get(handlers::documentation_list))
        .route(
            &paths.route("documentation/{id}/"),
            get(handlers::documentation_detail),
        )
        .route(&paths.records(), get(handlers::record_list))
        .route(&paths.route("records/{id}/"), get(handlers::record_detail))
        .route(
            &paths.route("raw/{record_type}/{field_name}/{id}/"),
            get(handlers::raw_view),
        )
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_sysadmin));

    let open = Router::new()
        .route(
            &paths.login(),
            get(handlers::login_form).post(handlers::login),
        )
        .route(&paths.logout(), get(handlers::logout));

    gated.merge(open).layer(Extension(ctx))
}
