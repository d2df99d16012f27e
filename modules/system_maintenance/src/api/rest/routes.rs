//! Route registration for the admin console

use super::{guard::require_super_admin, handlers::*, openapi::AdminApiDoc, AdminState};
use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Admin routes below `prefix` (no trailing slash)
pub fn router(prefix: &str, state: Arc<AdminState>) -> Router {
    let path = |suffix: &str| format!("{}/{}", prefix, suffix);

    Router::new()
        // Catalog
        .route(&path("systems"), get(list_systems).post(create_system))
        .route(
            &path("systems/{id}"),
            get(get_system).put(update_system).delete(delete_system),
        )
        .route(&path("hardware"), get(list_hardware).post(create_hardware))
        .route(
            &path("hardware/{id}"),
            get(get_hardware).put(update_hardware).delete(delete_hardware),
        )
        .route(&path("software"), get(list_software).post(create_software))
        .route(
            &path("software/{id}"),
            get(get_software).put(update_software).delete(delete_software),
        )
        .route(
            &path("maintenance-types"),
            get(list_maintenance_types).post(create_maintenance_type),
        )
        .route(
            &path("maintenance-types/{id}"),
            get(get_maintenance_type)
                .put(update_maintenance_type)
                .delete(delete_maintenance_type),
        )
        // Accounts
        .route(&path("accounts"), get(list_accounts).post(create_account))
        .route(
            &path("accounts/{id}"),
            get(get_account).put(update_account).delete(delete_account),
        )
        .route(&path("sys-admins"), get(list_sys_admins).post(create_sys_admin))
        .route(
            &path("sys-admins/{id}"),
            get(get_sys_admin).delete(delete_sys_admin),
        )
        // Records
        .route(
            &path("documentation-records"),
            get(list_documentation).post(create_documentation),
        )
        .route(
            &path("documentation-records/{id}"),
            get(get_documentation)
                .put(update_documentation)
                .delete(delete_documentation),
        )
        .route(
            &path("maintenance-records"),
            get(list_records).post(create_record),
        )
        .route(
            &path("maintenance-records/{id}"),
            get(get_record).put(update_record).delete(delete_record),
        )
        .route(&path("relationships"), post(create_relationship).get(list_relationships))
        .route(
            &path("relationships/{id}"),
            get(get_relationship).delete(delete_relationship),
        )
        .route(&path("openapi.json"), get(openapi_json))
        .route_layer(middleware::from_fn_with_state(
            state.service.clone(),
            require_super_admin,
        ))
        .layer(Extension(state))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(AdminApiDoc::openapi())
}
