//! SeaORM repository implementations

mod accounts;
mod catalog;
mod records;

pub use accounts::{SeaOrmAccountRepository, SeaOrmSessionRepository, SeaOrmSysAdminRepository};
pub use catalog::{
    SeaOrmHardwareRepository, SeaOrmMaintenanceTypeRepository, SeaOrmSoftwareRepository,
    SeaOrmSystemRepository,
};
pub use records::{
    SeaOrmDocumentationRepository, SeaOrmMaintenanceRecordRepository,
    SeaOrmRelationshipRepository,
};

use crate::domain::repository::{Repositories, UniqueViolation};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use std::sync::Arc;

/// Build every repository on top of one connection pool
pub fn repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        accounts: Arc::new(SeaOrmAccountRepository::new(db.clone())),
        sessions: Arc::new(SeaOrmSessionRepository::new(db.clone())),
        systems: Arc::new(SeaOrmSystemRepository::new(db.clone())),
        hardware: Arc::new(SeaOrmHardwareRepository::new(db.clone())),
        software: Arc::new(SeaOrmSoftwareRepository::new(db.clone())),
        maintenance_types: Arc::new(SeaOrmMaintenanceTypeRepository::new(db.clone())),
        sys_admins: Arc::new(SeaOrmSysAdminRepository::new(db.clone())),
        documentation: Arc::new(SeaOrmDocumentationRepository::new(db.clone())),
        records: Arc::new(SeaOrmMaintenanceRecordRepository::new(db.clone())),
        relationships: Arc::new(SeaOrmRelationshipRepository::new(db)),
    }
}

/// Turn a unique index violation into a `UniqueViolation` carrying `message`
fn unique(message: &str) -> impl Fn(DbErr) -> anyhow::Error + '_ {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UniqueViolation(message.to_string()).into(),
        _ => err.into(),
    }
}

/// Trimmed, non-empty search term
fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}
