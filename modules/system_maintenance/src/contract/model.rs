//! Contract models for the system maintenance module
//!
//! These models are transport-agnostic and shared by the web views, the
//! admin console and the storage layer.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use std::fmt;

/// Row identifier used by every table
pub type Id = i32;

/// Login identity that a SysAdmin profile is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Id,
    pub username: String,
    /// Salted password hash, see `domain::auth`
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// "First Last (username)" when a name is known, otherwise the username
    pub fn display_name(&self) -> String {
        display_name(&self.username, &self.first_name, &self.last_name)
    }
}

/// Persisted login session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub account_id: Id,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A computer system that maintenance is performed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct System {
    pub id: Id,
    pub name: String,
    pub description: String,
}

/// Hardware involved in maintenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hardware {
    pub id: Id,
    pub name: String,
}

/// Software package involved in maintenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Software {
    pub id: Id,
    pub name: String,
}

/// Category of maintenance (e.g. "Software Installation")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceType {
    pub id: Id,
    pub maintenance_type: String,
    pub description: String,
}

/// System administrator profile, one per account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysAdmin {
    pub id: Id,
    pub account_id: Id,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl SysAdmin {
    pub fn display_name(&self) -> String {
        display_name(&self.username, &self.first_name, &self.last_name)
    }
}

fn display_name(username: &str, first_name: &str, last_name: &str) -> String {
    if first_name.is_empty() && last_name.is_empty() {
        username.to_string()
    } else {
        format!("{} {} ({})", first_name, last_name, username)
    }
}

/// Dialect used to interpret the raw source of a markup field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkupType {
    /// Markdown with tables, fenced code and footnotes
    #[default]
    Markdown,
    /// Plain CommonMark
    MarkdownBasic,
    /// Escaped text with linebreaks and links
    PlainText,
    ReStructuredText,
}

impl MarkupType {
    pub const ALL: [MarkupType; 4] = [
        MarkupType::Markdown,
        MarkupType::MarkdownBasic,
        MarkupType::PlainText,
        MarkupType::ReStructuredText,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarkupType::Markdown => "Markdown",
            MarkupType::MarkdownBasic => "Markdown Basic",
            MarkupType::PlainText => "Plain Text",
            MarkupType::ReStructuredText => "reStructuredText",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for MarkupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Markup field: raw source, its declared type and the cached rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupText {
    pub raw: String,
    /// Empty when no type was declared; such text is passed through as-is
    pub markup_type: String,
    pub rendered: String,
}

/// Raw markup as submitted by an editor, before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupInput {
    pub raw: String,
    pub markup_type: String,
}

impl MarkupInput {
    pub fn new(raw: impl Into<String>, markup_type: MarkupType) -> Self {
        Self {
            raw: raw.into(),
            markup_type: markup_type.label().to_string(),
        }
    }
}

impl Default for MarkupInput {
    fn default() -> Self {
        Self::new(String::new(), MarkupType::default())
    }
}

/// Status of a maintenance record; free-form operator input, no transitions enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaintenanceStatus {
    Complete,
    #[default]
    InProgress,
    Failed,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 3] = [
        MaintenanceStatus::Complete,
        MaintenanceStatus::InProgress,
        MaintenanceStatus::Failed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MaintenanceStatus::Complete => "Complete",
            MaintenanceStatus::InProgress => "In Progress",
            MaintenanceStatus::Failed => "Failed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Standalone how-to document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationRecord {
    pub id: Id,
    pub title: String,
    pub maintenance_type_id: Id,
    pub documentation: MarkupText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One documented maintenance event against a system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRecord {
    pub id: Id,
    pub system_id: Id,
    pub sys_admin_id: Id,
    pub maintenance_type_id: Id,
    pub hardware_ids: Vec<Id>,
    pub software_ids: Vec<Id>,
    pub documentation_record_ids: Vec<Id>,
    pub status: MaintenanceStatus,
    pub datetime: DateTime<Utc>,
    pub description: MarkupText,
    pub procedure: MarkupText,
    pub problems: MarkupText,
}

/// Directed edge "referencing record references referenced record"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRelationship {
    pub id: Id,
    pub referencing_record_id: Id,
    pub referenced_record_id: Id,
}

// ===== Read models =====

/// Maintenance record with its dimensions resolved to display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub id: Id,
    pub system: String,
    pub maintenance_type: String,
    pub sys_admin: String,
    pub status: MaintenanceStatus,
    pub datetime: DateTime<Utc>,
}

impl RecordSummary {
    /// "{system} - {maintenance type} ({date})"
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({})",
            self.system,
            self.maintenance_type,
            self.datetime.date_naive()
        )
    }
}

/// Everything the record detail view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRecordDetail {
    pub record: MaintenanceRecord,
    pub summary: RecordSummary,
    pub system: System,
    pub maintenance_type: MaintenanceType,
    pub sys_admin: SysAdmin,
    pub hardware: Vec<Hardware>,
    pub software: Vec<Software>,
    pub documentation_records: Vec<DocumentationSummary>,
    /// Records this record references
    pub references: Vec<RecordSummary>,
    /// Records referencing this record
    pub referenced_by: Vec<RecordSummary>,
}

/// Documentation record with its maintenance type resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationSummary {
    pub id: Id,
    pub title: String,
    pub maintenance_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the documentation detail view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationDetail {
    pub record: DocumentationRecord,
    pub maintenance_type: MaintenanceType,
    pub maintenance_records: Vec<RecordSummary>,
}

/// Relationship edge with both endpoints labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSummary {
    pub relationship: RecordRelationship,
    pub referencing: RecordSummary,
    pub referenced: RecordSummary,
}

impl RelationshipSummary {
    pub fn label(&self) -> String {
        format!("{} ➤ {}", self.referencing.label(), self.referenced.label())
    }
}

/// Aggregate counts shown on the home view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityCounts {
    pub systems: u64,
    pub hardware: u64,
    pub software: u64,
    pub maintenance_types: u64,
    pub sys_admins: u64,
    pub maintenance_records: u64,
    pub documentation_records: u64,
}

/// Kinds of records whose markup fields can be inspected raw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawRecordKind {
    Documentation,
    Maintenance,
}

impl RawRecordKind {
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "documentation" => Some(Self::Documentation),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::Maintenance => "maintenance",
        }
    }
}

/// Unrendered source of one markup field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub kind: RawRecordKind,
    pub record_id: Id,
    pub record_label: String,
    pub field_name: String,
    pub markup_type: String,
    pub raw: String,
}

/// Authenticated caller, resolved from a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account: Account,
    pub sys_admin: Option<SysAdmin>,
}

// ===== Write models =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Partial account update; `None` keeps the current value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInput {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceTypeInput {
    pub maintenance_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationInput {
    pub title: String,
    pub maintenance_type_id: Id,
    pub documentation: MarkupInput,
    /// Replaces the set of maintenance records linking to this document
    pub maintenance_record_ids: Option<Vec<Id>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRecordInput {
    pub system_id: Id,
    pub sys_admin_id: Id,
    pub maintenance_type_id: Id,
    pub hardware_ids: Vec<Id>,
    pub software_ids: Vec<Id>,
    pub documentation_record_ids: Vec<Id>,
    /// Defaults to "In Progress"
    pub status: Option<MaintenanceStatus>,
    /// Defaults to the current time
    pub datetime: Option<DateTime<Utc>>,
    pub description: MarkupInput,
    pub procedure: MarkupInput,
    pub problems: MarkupInput,
}

// ===== Listing =====

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Zero-based page index, if this page starts inside `total` items
    ///
    /// Page 1 always exists. `None` for pages past the end, including ones
    /// whose offset does not fit in a `u64`.
    pub fn index_within(&self, total: u64) -> Option<u64> {
        let index = self.page - 1;
        if index == 0 {
            return Some(0);
        }
        match index.checked_mul(self.per_page) {
            Some(offset) if offset < total => Some(index),
            _ => None,
        }
    }

    pub fn empty_page<T>(&self, total: u64) -> Page<T> {
        Page {
            items: Vec::new(),
            total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// One page of results plus the total item count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    /// At least one page, even for an empty listing
    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page.max(1)).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Filters for listing maintenance records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordFilter {
    pub status: Option<MaintenanceStatus>,
    pub system_id: Option<Id>,
    pub maintenance_type_id: Option<Id>,
    pub sys_admin_id: Option<Id>,
    pub hardware_id: Option<Id>,
    pub software_id: Option<Id>,
    /// Substring search over description, procedure and problems
    pub search: Option<String>,
}

/// Filters for listing documentation records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentationFilter {
    pub maintenance_type_id: Option<Id>,
    /// Substring search over title and documentation
    pub search: Option<String>,
}

/// Dimension a maintenance record points at with a protected foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordReference {
    System(Id),
    SysAdmin(Id),
    MaintenanceType(Id),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index_within_total() {
        assert_eq!(PageRequest::new(1, 10).index_within(0), Some(0));
        assert_eq!(PageRequest::new(2, 10).index_within(11), Some(1));
        assert_eq!(PageRequest::new(2, 10).index_within(10), None);
        assert_eq!(PageRequest::new(u64::MAX / 4, 10).index_within(5), None);
        assert_eq!(PageRequest::new(u64::MAX, u64::MAX).index_within(u64::MAX), None);
    }

    #[test]
    fn test_markup_type_labels_round_trip() {
        for t in MarkupType::ALL {
            assert_eq!(MarkupType::from_label(t.label()), Some(t));
        }
        assert_eq!(MarkupType::from_label("markdown"), None);
        assert_eq!(MarkupType::from_label(""), None);
    }

    #[test]
    fn test_status_defaults_to_in_progress() {
        assert_eq!(MaintenanceStatus::default(), MaintenanceStatus::InProgress);
        assert_eq!(
            MaintenanceStatus::from_label("In Progress"),
            Some(MaintenanceStatus::InProgress)
        );
    }

    #[test]
    fn test_display_name() {
        let mut admin = SysAdmin {
            id: 1,
            account_id: 1,
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert_eq!(admin.display_name(), "alice");

        admin.first_name = "Alice".to_string();
        admin.last_name = "Liddell".to_string();
        assert_eq!(admin.display_name(), "Alice Liddell (alice)");
    }

    #[test]
    fn test_page_counts() {
        let page: Page<i32> = Page {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(page.num_pages(), 1);
        assert!(!page.has_next());

        let page: Page<i32> = Page {
            items: vec![1; 10],
            total: 21,
            page: 2,
            per_page: 10,
        };
        assert_eq!(page.num_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
