//! Conversions between admin console DTOs and contract models

use super::dto::*;
use crate::contract::{self, MaintenanceError, MaintenanceStatus};

// ===== Catalog conversions =====

impl From<contract::System> for SystemDto {
    fn from(system: contract::System) -> Self {
        Self {
            id: system.id,
            name: system.name,
            description: system.description,
        }
    }
}

impl From<SystemRequest> for contract::SystemInput {
    fn from(req: SystemRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

impl From<contract::Hardware> for NamedItemDto {
    fn from(item: contract::Hardware) -> Self {
        Self {
            id: item.id,
            name: item.name,
        }
    }
}

impl From<contract::Software> for NamedItemDto {
    fn from(item: contract::Software) -> Self {
        Self {
            id: item.id,
            name: item.name,
        }
    }
}

impl From<contract::MaintenanceType> for MaintenanceTypeDto {
    fn from(t: contract::MaintenanceType) -> Self {
        Self {
            id: t.id,
            maintenance_type: t.maintenance_type,
            description: t.description,
        }
    }
}

impl From<MaintenanceTypeRequest> for contract::MaintenanceTypeInput {
    fn from(req: MaintenanceTypeRequest) -> Self {
        Self {
            maintenance_type: req.maintenance_type,
            description: req.description,
        }
    }
}

// ===== Account conversions =====

impl From<contract::Account> for AccountDto {
    fn from(account: contract::Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            is_active: account.is_active,
            is_superuser: account.is_superuser,
            date_joined: account.date_joined,
        }
    }
}

impl From<CreateAccountRequest> for contract::NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            is_active: req.is_active,
            is_superuser: req.is_superuser,
        }
    }
}

impl From<UpdateAccountRequest> for contract::AccountUpdate {
    fn from(req: UpdateAccountRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            is_active: req.is_active,
            is_superuser: req.is_superuser,
        }
    }
}

impl From<contract::SysAdmin> for SysAdminDto {
    fn from(admin: contract::SysAdmin) -> Self {
        let display_name = admin.display_name();
        Self {
            id: admin.id,
            account_id: admin.account_id,
            username: admin.username,
            display_name,
        }
    }
}

// ===== Markup conversions =====

impl From<contract::MarkupText> for MarkupDto {
    fn from(text: contract::MarkupText) -> Self {
        Self {
            raw: text.raw,
            markup_type: text.markup_type,
            rendered: text.rendered,
        }
    }
}

impl From<MarkupRequest> for contract::MarkupInput {
    fn from(req: MarkupRequest) -> Self {
        Self {
            raw: req.raw,
            markup_type: req.markup_type,
        }
    }
}

// ===== Record conversions =====

impl From<contract::DocumentationRecord> for DocumentationRecordDto {
    fn from(record: contract::DocumentationRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            maintenance_type_id: record.maintenance_type_id,
            documentation: record.documentation.into(),
            maintenance_record_ids: None,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<DocumentationRecordRequest> for contract::DocumentationInput {
    fn from(req: DocumentationRecordRequest) -> Self {
        Self {
            title: req.title,
            maintenance_type_id: req.maintenance_type_id,
            documentation: req.documentation.into(),
            maintenance_record_ids: req.maintenance_record_ids,
        }
    }
}

impl From<contract::Page<contract::DocumentationRecord>> for DocumentationRecordPage {
    fn from(page: contract::Page<contract::DocumentationRecord>) -> Self {
        let num_pages = page.num_pages();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            num_pages,
        }
    }
}

impl From<contract::MaintenanceRecord> for MaintenanceRecordDto {
    fn from(record: contract::MaintenanceRecord) -> Self {
        Self {
            id: record.id,
            system_id: record.system_id,
            sys_admin_id: record.sys_admin_id,
            maintenance_type_id: record.maintenance_type_id,
            hardware_ids: record.hardware_ids,
            software_ids: record.software_ids,
            documentation_record_ids: record.documentation_record_ids,
            status: record.status.label().to_string(),
            datetime: record.datetime,
            description: record.description.into(),
            procedure: record.procedure.into(),
            problems: record.problems.into(),
        }
    }
}

/// Status labels are the only free text in a record request that must match a choice
pub fn parse_status(label: &str) -> Result<MaintenanceStatus, MaintenanceError> {
    MaintenanceStatus::from_label(label).ok_or_else(|| {
        MaintenanceError::validation(
            "status",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                label
            ),
        )
    })
}

impl TryFrom<MaintenanceRecordRequest> for contract::MaintenanceRecordInput {
    type Error = MaintenanceError;

    fn try_from(req: MaintenanceRecordRequest) -> Result<Self, Self::Error> {
        let status = req.status.as_deref().map(parse_status).transpose()?;
        Ok(Self {
            system_id: req.system_id,
            sys_admin_id: req.sys_admin_id,
            maintenance_type_id: req.maintenance_type_id,
            hardware_ids: req.hardware_ids,
            software_ids: req.software_ids,
            documentation_record_ids: req.documentation_record_ids,
            status,
            datetime: req.datetime,
            description: req.description.into(),
            procedure: req.procedure.into(),
            problems: req.problems.into(),
        })
    }
}

impl From<contract::Page<contract::MaintenanceRecord>> for MaintenanceRecordPage {
    fn from(page: contract::Page<contract::MaintenanceRecord>) -> Self {
        let num_pages = page.num_pages();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            num_pages,
        }
    }
}

// ===== Relationship conversions =====

impl From<contract::RecordRelationship> for RelationshipDto {
    fn from(edge: contract::RecordRelationship) -> Self {
        Self {
            id: edge.id,
            referencing_record_id: edge.referencing_record_id,
            referenced_record_id: edge.referenced_record_id,
            label: None,
        }
    }
}

impl From<contract::RelationshipSummary> for RelationshipDto {
    fn from(summary: contract::RelationshipSummary) -> Self {
        let label = summary.label();
        Self {
            label: Some(label),
            ..summary.relationship.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: Option<&str>) -> MaintenanceRecordRequest {
        MaintenanceRecordRequest {
            system_id: 1,
            sys_admin_id: 1,
            maintenance_type_id: 1,
            hardware_ids: vec![2, 3],
            software_ids: vec![],
            documentation_record_ids: vec![],
            status: status.map(str::to_string),
            datetime: None,
            description: MarkupRequest::default(),
            procedure: MarkupRequest::default(),
            problems: MarkupRequest::default(),
        }
    }

    #[test]
    fn test_record_request_status_labels() {
        let input = contract::MaintenanceRecordInput::try_from(request(Some("Failed"))).unwrap();
        assert_eq!(input.status, Some(MaintenanceStatus::Failed));
        assert_eq!(input.hardware_ids, vec![2, 3]);

        let input = contract::MaintenanceRecordInput::try_from(request(None)).unwrap();
        assert_eq!(input.status, None);
        assert_eq!(input.description.markup_type, "Markdown");
    }

    #[test]
    fn test_record_request_rejects_unknown_status() {
        let err = contract::MaintenanceRecordInput::try_from(request(Some("done"))).unwrap_err();
        assert!(matches!(err, MaintenanceError::Validation { ref field, .. } if field == "status"));
    }
}
