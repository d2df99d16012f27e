//! Module wiring: configuration, storage, service and HTTP routes

use crate::api::rest::{routes as admin_routes, AdminState};
use crate::api::web::{paths::Paths, routes as web_routes, WebContext};
use crate::config::Config;
use crate::domain::Service;
use crate::infra::storage::{migrations::Migrator, repositories::repositories};
use anyhow::Result;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// System maintenance module
pub struct SystemMaintenanceModule {
    config: Config,
    service: Arc<Service>,
}

impl SystemMaintenanceModule {
    /// Build repositories and the domain service on top of `db`
    pub fn new(config: Config, db: Arc<DatabaseConnection>) -> Self {
        let service = Arc::new(Service::new(repositories(db), config.session_ttl));
        tracing::info!(
            mount = %config.mount_prefix(),
            admin = %config.admin_prefix(),
            "System maintenance module initialized"
        );
        Self { config, service }
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None).await?;
        tracing::info!("System maintenance migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// HTML views and admin console, each under its configured prefix
    pub fn router(&self) -> Router {
        let paths = Paths::new(self.config.mount_prefix(), self.config.admin_prefix());
        let web = web_routes::router(Arc::new(WebContext {
            service: self.service.clone(),
            paths,
            paginate_by: self.config.paginate_by,
            session_ttl: self.config.session_ttl,
            secure_cookies: self.config.secure_cookies,
        }));
        let admin = admin_routes::router(
            &self.config.admin_prefix(),
            Arc::new(AdminState {
                service: self.service.clone(),
                paginate_by: self.config.paginate_by,
            }),
        );
        tracing::info!("Registering system maintenance routes");
        web.merge(admin)
    }
}
