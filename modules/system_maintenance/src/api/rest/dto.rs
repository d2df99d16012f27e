//! Admin console DTOs with serde derives for the JSON API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Catalog DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemDto {
    pub id: i32,
    #[schema(example = "web01")]
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SystemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Hardware or software item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamedItemDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NamedItemRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceTypeDto {
    pub id: i32,
    #[schema(example = "Software Installation")]
    pub maintenance_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaintenanceTypeRequest {
    pub maintenance_type: String,
    #[serde(default)]
    pub description: String,
}

// ===== Account DTOs =====

/// Account as shown to administrators; the password hash never leaves the server
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountDto {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

fn default_true() -> bool {
    true
}

/// Partial account update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    /// New password, hashed before storage
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SysAdminDto {
    pub id: i32,
    pub account_id: i32,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSysAdminRequest {
    pub account_id: i32,
}

// ===== Markup DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkupDto {
    pub raw: String,
    /// One of "Markdown", "Markdown Basic", "Plain Text", "reStructuredText", or empty
    pub markup_type: String,
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MarkupRequest {
    #[serde(default)]
    pub raw: String,
    #[serde(default = "default_markup_type")]
    #[schema(example = "Markdown")]
    pub markup_type: String,
}

impl Default for MarkupRequest {
    fn default() -> Self {
        Self {
            raw: String::new(),
            markup_type: default_markup_type(),
        }
    }
}

fn default_markup_type() -> String {
    "Markdown".to_string()
}

// ===== Documentation DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentationRecordDto {
    pub id: i32,
    pub title: String,
    pub maintenance_type_id: i32,
    pub documentation: MarkupDto,
    /// Maintenance records linking to this document; omitted in listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_record_ids: Option<Vec<i32>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentationRecordRequest {
    pub title: String,
    pub maintenance_type_id: i32,
    #[serde(default)]
    pub documentation: MarkupRequest,
    /// Replaces the set of linking maintenance records when present
    pub maintenance_record_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentationRecordPage {
    pub items: Vec<DocumentationRecordDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub num_pages: u64,
}

// ===== Maintenance Record DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecordDto {
    pub id: i32,
    pub system_id: i32,
    pub sys_admin_id: i32,
    pub maintenance_type_id: i32,
    pub hardware_ids: Vec<i32>,
    pub software_ids: Vec<i32>,
    pub documentation_record_ids: Vec<i32>,
    #[schema(example = "In Progress")]
    pub status: String,
    pub datetime: DateTime<Utc>,
    pub description: MarkupDto,
    pub procedure: MarkupDto,
    pub problems: MarkupDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaintenanceRecordRequest {
    pub system_id: i32,
    pub sys_admin_id: i32,
    pub maintenance_type_id: i32,
    #[serde(default)]
    pub hardware_ids: Vec<i32>,
    #[serde(default)]
    pub software_ids: Vec<i32>,
    #[serde(default)]
    pub documentation_record_ids: Vec<i32>,
    /// "Complete", "In Progress" or "Failed"; defaults to "In Progress" on create
    pub status: Option<String>,
    /// Defaults to now on create
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: MarkupRequest,
    #[serde(default)]
    pub procedure: MarkupRequest,
    #[serde(default)]
    pub problems: MarkupRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecordPage {
    pub items: Vec<MaintenanceRecordDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub num_pages: u64,
}

// ===== Relationship DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelationshipDto {
    pub id: i32,
    pub referencing_record_id: i32,
    pub referenced_record_id: i32,
    /// Present in listings, where both endpoints are resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRelationshipRequest {
    pub referencing_record_id: i32,
    pub referenced_record_id: i32,
}
