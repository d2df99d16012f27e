//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.

use crate::contract::{
    Account, DocumentationFilter, DocumentationRecord, Hardware, Id, MaintenanceRecord,
    MaintenanceType, Page, PageRequest, RecordFilter, RecordReference, RecordRelationship,
    Session, Software, SysAdmin, System,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Raised by repositories when a write hits a unique index
///
/// The service turns it into a `Conflict` instead of an internal error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UniqueViolation(pub String);

/// Repository for login accounts
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account; the `id` field is ignored
    async fn create(&self, account: &Account) -> Result<Account>;

    async fn update(&self, account: &Account) -> Result<Account>;

    async fn find_by_id(&self, id: Id) -> Result<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// All accounts ordered by username
    async fn list_all(&self) -> Result<Vec<Account>>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session>;

    async fn find(&self, token: &str) -> Result<Option<Session>>;

    async fn delete(&self, token: &str) -> Result<()>;

    /// Remove sessions that expired before `now`, returning how many were removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Repository for systems
#[async_trait]
pub trait SystemRepository: Send + Sync {
    async fn create(&self, system: &System) -> Result<System>;

    async fn update(&self, system: &System) -> Result<System>;

    async fn find_by_id(&self, id: Id) -> Result<Option<System>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<System>>;

    /// Systems ordered by name, optionally filtered by a name/description substring
    async fn list(&self, search: Option<&str>) -> Result<Vec<System>>;

    async fn count(&self) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for hardware
#[async_trait]
pub trait HardwareRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Hardware>;

    async fn update(&self, hardware: &Hardware) -> Result<Hardware>;

    async fn find_by_id(&self, id: Id) -> Result<Option<Hardware>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Hardware>>;

    /// Hardware with the given ids, ordered by name; unknown ids are skipped
    async fn find_many(&self, ids: &[Id]) -> Result<Vec<Hardware>>;

    async fn list(&self, search: Option<&str>) -> Result<Vec<Hardware>>;

    async fn count(&self) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for software packages
#[async_trait]
pub trait SoftwareRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Software>;

    async fn update(&self, software: &Software) -> Result<Software>;

    async fn find_by_id(&self, id: Id) -> Result<Option<Software>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Software>>;

    /// Software with the given ids, ordered by name; unknown ids are skipped
    async fn find_many(&self, ids: &[Id]) -> Result<Vec<Software>>;

    async fn list(&self, search: Option<&str>) -> Result<Vec<Software>>;

    async fn count(&self) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for maintenance types
#[async_trait]
pub trait MaintenanceTypeRepository: Send + Sync {
    async fn create(&self, maintenance_type: &MaintenanceType) -> Result<MaintenanceType>;

    async fn update(&self, maintenance_type: &MaintenanceType) -> Result<MaintenanceType>;

    async fn find_by_id(&self, id: Id) -> Result<Option<MaintenanceType>>;

    async fn find_by_label(&self, label: &str) -> Result<Option<MaintenanceType>>;

    /// Maintenance types ordered by label
    async fn list(&self, search: Option<&str>) -> Result<Vec<MaintenanceType>>;

    async fn count(&self) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for SysAdmin profiles
#[async_trait]
pub trait SysAdminRepository: Send + Sync {
    async fn create(&self, account_id: Id) -> Result<SysAdmin>;

    async fn find_by_id(&self, id: Id) -> Result<Option<SysAdmin>>;

    /// Point lookup on the unique account index
    async fn find_by_account(&self, account_id: Id) -> Result<Option<SysAdmin>>;

    /// SysAdmins ordered by account username
    async fn list_all(&self) -> Result<Vec<SysAdmin>>;

    async fn count(&self) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for documentation records
#[async_trait]
pub trait DocumentationRepository: Send + Sync {
    /// Insert a record and, when given, the maintenance records linking to it
    async fn create(
        &self,
        record: &DocumentationRecord,
        maintenance_record_ids: Option<&[Id]>,
    ) -> Result<DocumentationRecord>;

    /// Update a record and, when given, replace the maintenance records linking to it
    async fn update(
        &self,
        record: &DocumentationRecord,
        maintenance_record_ids: Option<&[Id]>,
    ) -> Result<DocumentationRecord>;

    async fn find_by_id(&self, id: Id) -> Result<Option<DocumentationRecord>>;

    async fn find_by_title(&self, title: &str) -> Result<Option<DocumentationRecord>>;

    /// Records with the given ids, ordered by title; unknown ids are skipped
    async fn find_many(&self, ids: &[Id]) -> Result<Vec<DocumentationRecord>>;

    /// One page ordered by title
    async fn list_page(
        &self,
        filter: &DocumentationFilter,
        page: PageRequest,
    ) -> Result<Page<DocumentationRecord>>;

    /// Ids of maintenance records linking to a documentation record
    async fn linked_maintenance_record_ids(&self, id: Id) -> Result<Vec<Id>>;

    async fn count(&self) -> Result<u64>;

    async fn count_by_maintenance_type(&self, maintenance_type_id: Id) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for maintenance records and their associations
#[async_trait]
pub trait MaintenanceRecordRepository: Send + Sync {
    /// Insert a record with its hardware, software and documentation links atomically
    async fn create(&self, record: &MaintenanceRecord) -> Result<MaintenanceRecord>;

    /// Update a record and replace its links atomically
    async fn update(&self, record: &MaintenanceRecord) -> Result<MaintenanceRecord>;

    async fn find_by_id(&self, id: Id) -> Result<Option<MaintenanceRecord>>;

    /// Records with the given ids, most recent first; unknown ids are skipped
    async fn find_many(&self, ids: &[Id]) -> Result<Vec<MaintenanceRecord>>;

    /// One page, most recent first
    async fn list_page(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<MaintenanceRecord>>;

    async fn count(&self) -> Result<u64>;

    /// Number of records pointing at a protected dimension
    async fn count_referencing(&self, reference: RecordReference) -> Result<u64>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// Repository for record-to-record relationship edges
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    async fn create(&self, referencing_record_id: Id, referenced_record_id: Id)
        -> Result<RecordRelationship>;

    async fn find_by_id(&self, id: Id) -> Result<Option<RecordRelationship>>;

    async fn find_by_pair(
        &self,
        referencing_record_id: Id,
        referenced_record_id: Id,
    ) -> Result<Option<RecordRelationship>>;

    /// All edges, ordered by referencing record (most recent first)
    async fn list_all(&self) -> Result<Vec<RecordRelationship>>;

    /// Edges where the record is either endpoint
    async fn list_for_record(&self, record_id: Id) -> Result<Vec<RecordRelationship>>;

    async fn delete(&self, id: Id) -> Result<()>;
}

/// All repositories the domain service works with
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub systems: Arc<dyn SystemRepository>,
    pub hardware: Arc<dyn HardwareRepository>,
    pub software: Arc<dyn SoftwareRepository>,
    pub maintenance_types: Arc<dyn MaintenanceTypeRepository>,
    pub sys_admins: Arc<dyn SysAdminRepository>,
    pub documentation: Arc<dyn DocumentationRepository>,
    pub records: Arc<dyn MaintenanceRecordRepository>,
    pub relationships: Arc<dyn RelationshipRepository>,
}
