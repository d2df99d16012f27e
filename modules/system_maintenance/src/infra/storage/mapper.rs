//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{
    accounts, documentation_records, hardware, maintenance_records, maintenance_types, sessions,
    software, sys_admins, systems,
};
use crate::contract::{
    Account, DocumentationRecord, Hardware, Id, MaintenanceRecord, MaintenanceStatus,
    MaintenanceType, MarkupText, Session, Software, SysAdmin, System,
};
use anyhow::anyhow;
use sea_orm::ActiveValue::{NotSet, Set};

/// Primary keys of zero are "not assigned yet"
fn id_value(id: Id) -> sea_orm::ActiveValue<Id> {
    if id == 0 {
        NotSet
    } else {
        Set(id)
    }
}

// ===== Account Conversions =====

impl From<accounts::Model> for Account {
    fn from(entity: accounts::Model) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            password_hash: entity.password_hash,
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            is_active: entity.is_active,
            is_superuser: entity.is_superuser,
            date_joined: entity.date_joined,
        }
    }
}

impl From<&Account> for accounts::ActiveModel {
    fn from(model: &Account) -> Self {
        Self {
            id: id_value(model.id),
            username: Set(model.username.clone()),
            password_hash: Set(model.password_hash.clone()),
            first_name: Set(model.first_name.clone()),
            last_name: Set(model.last_name.clone()),
            email: Set(model.email.clone()),
            is_active: Set(model.is_active),
            is_superuser: Set(model.is_superuser),
            date_joined: Set(model.date_joined),
        }
    }
}

// ===== Session Conversions =====

impl From<sessions::Model> for Session {
    fn from(entity: sessions::Model) -> Self {
        Self {
            token: entity.token,
            account_id: entity.account_id,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}

impl From<&Session> for sessions::ActiveModel {
    fn from(model: &Session) -> Self {
        Self {
            token: Set(model.token.clone()),
            account_id: Set(model.account_id),
            created_at: Set(model.created_at),
            expires_at: Set(model.expires_at),
        }
    }
}

// ===== Catalog Conversions =====

impl From<systems::Model> for System {
    fn from(entity: systems::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
        }
    }
}

impl From<&System> for systems::ActiveModel {
    fn from(model: &System) -> Self {
        Self {
            id: id_value(model.id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
        }
    }
}

impl From<hardware::Model> for Hardware {
    fn from(entity: hardware::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

impl From<software::Model> for Software {
    fn from(entity: software::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

impl From<maintenance_types::Model> for MaintenanceType {
    fn from(entity: maintenance_types::Model) -> Self {
        Self {
            id: entity.id,
            maintenance_type: entity.maintenance_type,
            description: entity.description,
        }
    }
}

impl From<&MaintenanceType> for maintenance_types::ActiveModel {
    fn from(model: &MaintenanceType) -> Self {
        Self {
            id: id_value(model.id),
            maintenance_type: Set(model.maintenance_type.clone()),
            description: Set(model.description.clone()),
        }
    }
}

/// SysAdmin rows carry no names; they come from the joined account
pub fn sys_admin_from(entity: sys_admins::Model, account: Option<accounts::Model>) -> SysAdmin {
    let (username, first_name, last_name) = account
        .map(|a| (a.username, a.first_name, a.last_name))
        .unwrap_or_default();
    SysAdmin {
        id: entity.id,
        account_id: entity.account_id,
        username,
        first_name,
        last_name,
    }
}

// ===== Documentation Conversions =====

impl From<documentation_records::Model> for DocumentationRecord {
    fn from(entity: documentation_records::Model) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            maintenance_type_id: entity.maintenance_type_id,
            documentation: MarkupText {
                raw: entity.documentation,
                markup_type: entity.documentation_markup_type,
                rendered: entity.documentation_rendered,
            },
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&DocumentationRecord> for documentation_records::ActiveModel {
    fn from(model: &DocumentationRecord) -> Self {
        Self {
            id: id_value(model.id),
            title: Set(model.title.clone()),
            maintenance_type_id: Set(model.maintenance_type_id),
            documentation: Set(model.documentation.raw.clone()),
            documentation_markup_type: Set(model.documentation.markup_type.clone()),
            documentation_rendered: Set(model.documentation.rendered.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Maintenance Record Conversions =====

/// Association ids loaded from the join tables
#[derive(Debug, Default, Clone)]
pub struct RecordLinks {
    pub hardware_ids: Vec<Id>,
    pub software_ids: Vec<Id>,
    pub documentation_record_ids: Vec<Id>,
}

pub fn record_from(
    entity: maintenance_records::Model,
    links: RecordLinks,
) -> anyhow::Result<MaintenanceRecord> {
    let status = MaintenanceStatus::from_label(&entity.status)
        .ok_or_else(|| anyhow!("unknown maintenance status '{}'", entity.status))?;
    Ok(MaintenanceRecord {
        id: entity.id,
        system_id: entity.system_id,
        sys_admin_id: entity.sys_admin_id,
        maintenance_type_id: entity.maintenance_type_id,
        hardware_ids: links.hardware_ids,
        software_ids: links.software_ids,
        documentation_record_ids: links.documentation_record_ids,
        status,
        datetime: entity.datetime,
        description: MarkupText {
            raw: entity.description,
            markup_type: entity.description_markup_type,
            rendered: entity.description_rendered,
        },
        procedure: MarkupText {
            raw: entity.procedure,
            markup_type: entity.procedure_markup_type,
            rendered: entity.procedure_rendered,
        },
        problems: MarkupText {
            raw: entity.problems,
            markup_type: entity.problems_markup_type,
            rendered: entity.problems_rendered,
        },
    })
}

impl From<&MaintenanceRecord> for maintenance_records::ActiveModel {
    fn from(model: &MaintenanceRecord) -> Self {
        Self {
            id: id_value(model.id),
            system_id: Set(model.system_id),
            sys_admin_id: Set(model.sys_admin_id),
            maintenance_type_id: Set(model.maintenance_type_id),
            status: Set(model.status.label().to_string()),
            datetime: Set(model.datetime),
            description: Set(model.description.raw.clone()),
            description_markup_type: Set(model.description.markup_type.clone()),
            description_rendered: Set(model.description.rendered.clone()),
            procedure: Set(model.procedure.raw.clone()),
            procedure_markup_type: Set(model.procedure.markup_type.clone()),
            procedure_rendered: Set(model.procedure.rendered.clone()),
            problems: Set(model.problems.raw.clone()),
            problems_markup_type: Set(model.problems.markup_type.clone()),
            problems_rendered: Set(model.problems.rendered.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record_model(status: &str) -> maintenance_records::Model {
        maintenance_records::Model {
            id: 4,
            system_id: 1,
            sys_admin_id: 2,
            maintenance_type_id: 3,
            status: status.to_string(),
            datetime: Utc::now(),
            description: "**d**".to_string(),
            description_markup_type: "Markdown".to_string(),
            description_rendered: "<p><strong>d</strong></p>\n".to_string(),
            procedure: String::new(),
            procedure_markup_type: "Markdown".to_string(),
            procedure_rendered: String::new(),
            problems: String::new(),
            problems_markup_type: String::new(),
            problems_rendered: String::new(),
        }
    }

    #[test]
    fn test_record_from_model() {
        let links = RecordLinks {
            hardware_ids: vec![5],
            ..Default::default()
        };
        let record = record_from(record_model("Failed"), links).unwrap();
        assert_eq!(record.status, MaintenanceStatus::Failed);
        assert_eq!(record.hardware_ids, vec![5]);
        assert_eq!(record.description.raw, "**d**");
        assert_eq!(record.description.rendered, "<p><strong>d</strong></p>\n");
    }

    #[test]
    fn test_record_with_unknown_status_is_rejected() {
        assert!(record_from(record_model("Paused"), RecordLinks::default()).is_err());
    }

    #[test]
    fn test_unassigned_id_is_not_set() {
        let system = System {
            id: 0,
            name: "web01".to_string(),
            description: String::new(),
        };
        let active: systems::ActiveModel = (&system).into();
        assert!(matches!(active.id, NotSet));
    }

    #[test]
    fn test_sys_admin_takes_names_from_account() {
        let account = accounts::Model {
            id: 9,
            username: "alice".to_string(),
            password_hash: String::new(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            email: String::new(),
            is_active: true,
            is_superuser: false,
            date_joined: Utc::now(),
        };
        let admin = sys_admin_from(sys_admins::Model { id: 1, account_id: 9 }, Some(account));
        assert_eq!(admin.display_name(), "Alice Liddell (alice)");
    }
}
