//! System Maintenance Module
//!
//! Tracks maintenance performed on computer systems: which sysadmin did
//! what to which system, with hardware and software involved, markup
//! bodies rendered on save, linked documentation and directed references
//! between records. Browsing is limited to active SysAdmins; the admin
//! console is limited to super-admins.

// Public exports
pub mod contract;
pub use contract::{
    error::MaintenanceError, Account, DocumentationRecord, MaintenanceRecord, MaintenanceStatus,
    MarkupType, RecordRelationship, SysAdmin, System,
};

pub mod module;
pub use module::SystemMaintenanceModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
