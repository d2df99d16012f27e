use super::{render_markup, storage, Service};
use crate::contract::{
    DocumentationDetail, DocumentationFilter, DocumentationInput, DocumentationRecord,
    DocumentationSummary, Id, MaintenanceError, MaintenanceRecord, MaintenanceRecordDetail,
    MaintenanceRecordInput, Page, PageRequest, RawField, RawRecordKind, RecordFilter,
    RecordRelationship, RecordSummary, RelationshipSummary,
};
use crate::domain::validation::{unique_ids, validate_name, validate_relationship};
use chrono::Utc;
use std::collections::HashMap;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Markup fields of a maintenance record that the raw view exposes
const RECORD_MARKUP_FIELDS: [&str; 3] = ["description", "procedure", "problems"];

/// Requesting a page past the last one is a not-found, like an unknown id
fn ensure_page_exists<T>(page: &Page<T>) -> Result<(), MaintenanceError> {
    if page.page > page.num_pages() {
        return Err(MaintenanceError::not_found("page", page.page));
    }
    Ok(())
}

fn missing_choices(field: &str, requested: &[Id], found: &[Id]) -> MaintenanceError {
    let missing = requested
        .iter()
        .find(|id| !found.contains(id))
        .map(|id| id.to_string())
        .unwrap_or_default();
    MaintenanceError::validation(
        field,
        format!(
            "Select a valid choice. {} is not one of the available choices.",
            missing
        ),
    )
}

impl Service {
    // ===== Maintenance Records =====

    /// Create a record together with its hardware, software and documentation links
    pub async fn create_record(
        &self,
        input: MaintenanceRecordInput,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let record = self.build_record(None, input).await?;
        let created = self
            .repos
            .records
            .create(&record)
            .await
            .map_err(storage("create maintenance record"))?;
        tracing::info!(record_id = created.id, system_id = created.system_id, "maintenance record created");
        Ok(created)
    }

    /// Update a record and replace its links; unset status and datetime keep their values
    pub async fn update_record(
        &self,
        id: Id,
        input: MaintenanceRecordInput,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let current = self.get_record(id).await?;
        let record = self.build_record(Some(current), input).await?;
        self.repos
            .records
            .update(&record)
            .await
            .map_err(storage("update maintenance record"))
    }

    pub async fn get_record(&self, id: Id) -> Result<MaintenanceRecord, MaintenanceError> {
        self.repos
            .records
            .find_by_id(id)
            .await
            .map_err(storage("get maintenance record"))?
            .ok_or_else(|| MaintenanceError::not_found("maintenance record", id))
    }

    /// Delete a record; relationship edges and association rows go with it
    pub async fn delete_record(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_record(id).await?;
        self.repos
            .records
            .delete(id)
            .await
            .map_err(storage("delete maintenance record"))?;
        tracing::info!(record_id = id, "maintenance record deleted");
        Ok(())
    }

    pub async fn list_records(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<MaintenanceRecord>, MaintenanceError> {
        let page = self
            .repos
            .records
            .list_page(filter, page)
            .await
            .map_err(storage("list maintenance records"))?;
        ensure_page_exists(&page)?;
        Ok(page)
    }

    /// Page of records with their dimensions resolved, most recent first
    pub async fn list_record_summaries(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<RecordSummary>, MaintenanceError> {
        let page = self.list_records(filter, page).await?;
        let items = self.summarize(&page.items).await?;
        Ok(Page {
            items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Everything shown on the record detail view
    pub async fn record_detail(&self, id: Id) -> Result<MaintenanceRecordDetail, MaintenanceError> {
        let record = self.get_record(id).await?;
        let system = self.get_system(record.system_id).await?;
        let maintenance_type = self.get_maintenance_type(record.maintenance_type_id).await?;
        let sys_admin = self.get_sys_admin(record.sys_admin_id).await?;

        let hardware = self
            .repos
            .hardware
            .find_many(&record.hardware_ids)
            .await
            .map_err(storage("find hardware"))?;
        let software = self
            .repos
            .software
            .find_many(&record.software_ids)
            .await
            .map_err(storage("find software"))?;
        let documents = self
            .repos
            .documentation
            .find_many(&record.documentation_record_ids)
            .await
            .map_err(storage("find documentation"))?;
        let documentation_records = self.summarize_documentation(&documents).await?;

        let edges = self
            .repos
            .relationships
            .list_for_record(id)
            .await
            .map_err(storage("list relationships"))?;
        let referenced_ids: Vec<Id> = edges
            .iter()
            .filter(|e| e.referencing_record_id == id)
            .map(|e| e.referenced_record_id)
            .collect();
        let referencing_ids: Vec<Id> = edges
            .iter()
            .filter(|e| e.referenced_record_id == id)
            .map(|e| e.referencing_record_id)
            .collect();
        let references = self.summaries_for(&referenced_ids).await?;
        let referenced_by = self.summaries_for(&referencing_ids).await?;

        let summary = RecordSummary {
            id: record.id,
            system: system.name.clone(),
            maintenance_type: maintenance_type.maintenance_type.clone(),
            sys_admin: sys_admin.display_name(),
            status: record.status,
            datetime: record.datetime,
        };

        Ok(MaintenanceRecordDetail {
            record,
            summary,
            system,
            maintenance_type,
            sys_admin,
            hardware,
            software,
            documentation_records,
            references,
            referenced_by,
        })
    }

    async fn build_record(
        &self,
        current: Option<MaintenanceRecord>,
        input: MaintenanceRecordInput,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let system = self
            .repos
            .systems
            .find_by_id(input.system_id)
            .await
            .map_err(storage("get system"))?;
        if system.is_none() {
            return Err(MaintenanceError::validation("system_id", INVALID_CHOICE));
        }
        let sys_admin = self
            .repos
            .sys_admins
            .find_by_id(input.sys_admin_id)
            .await
            .map_err(storage("get sys admin"))?;
        if sys_admin.is_none() {
            return Err(MaintenanceError::validation("sys_admin_id", INVALID_CHOICE));
        }
        let maintenance_type = self
            .repos
            .maintenance_types
            .find_by_id(input.maintenance_type_id)
            .await
            .map_err(storage("get maintenance type"))?;
        if maintenance_type.is_none() {
            return Err(MaintenanceError::validation(
                "maintenance_type_id",
                INVALID_CHOICE,
            ));
        }

        let hardware_ids = unique_ids(&input.hardware_ids);
        let found: Vec<Id> = self
            .repos
            .hardware
            .find_many(&hardware_ids)
            .await
            .map_err(storage("find hardware"))?
            .into_iter()
            .map(|h| h.id)
            .collect();
        if found.len() != hardware_ids.len() {
            return Err(missing_choices("hardware_ids", &hardware_ids, &found));
        }

        let software_ids = unique_ids(&input.software_ids);
        let found: Vec<Id> = self
            .repos
            .software
            .find_many(&software_ids)
            .await
            .map_err(storage("find software"))?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if found.len() != software_ids.len() {
            return Err(missing_choices("software_ids", &software_ids, &found));
        }

        let documentation_record_ids = unique_ids(&input.documentation_record_ids);
        let found: Vec<Id> = self
            .repos
            .documentation
            .find_many(&documentation_record_ids)
            .await
            .map_err(storage("find documentation"))?
            .into_iter()
            .map(|d| d.id)
            .collect();
        if found.len() != documentation_record_ids.len() {
            return Err(missing_choices(
                "documentation_record_ids",
                &documentation_record_ids,
                &found,
            ));
        }

        let description = render_markup("description", &input.description)?;
        let procedure = render_markup("procedure", &input.procedure)?;
        let problems = render_markup("problems", &input.problems)?;

        let (id, status, datetime) = match current {
            Some(current) => (
                current.id,
                input.status.unwrap_or(current.status),
                input.datetime.unwrap_or(current.datetime),
            ),
            None => (
                0,
                input.status.unwrap_or_default(),
                input.datetime.unwrap_or_else(Utc::now),
            ),
        };

        Ok(MaintenanceRecord {
            id,
            system_id: input.system_id,
            sys_admin_id: input.sys_admin_id,
            maintenance_type_id: input.maintenance_type_id,
            hardware_ids,
            software_ids,
            documentation_record_ids,
            status,
            datetime,
            description,
            procedure,
            problems,
        })
    }

    /// Summaries for the given record ids, most recent first
    async fn summaries_for(&self, ids: &[Id]) -> Result<Vec<RecordSummary>, MaintenanceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self
            .repos
            .records
            .find_many(ids)
            .await
            .map_err(storage("find maintenance records"))?;
        self.summarize(&records).await
    }

    /// Resolve dimension names, looking each distinct id up once
    async fn summarize(
        &self,
        records: &[MaintenanceRecord],
    ) -> Result<Vec<RecordSummary>, MaintenanceError> {
        let mut systems: HashMap<Id, String> = HashMap::new();
        let mut types: HashMap<Id, String> = HashMap::new();
        let mut admins: HashMap<Id, String> = HashMap::new();
        let mut summaries = Vec::with_capacity(records.len());

        for record in records {
            if !systems.contains_key(&record.system_id) {
                let system = self.get_system(record.system_id).await?;
                systems.insert(system.id, system.name);
            }
            if !types.contains_key(&record.maintenance_type_id) {
                let found = self.get_maintenance_type(record.maintenance_type_id).await?;
                types.insert(found.id, found.maintenance_type);
            }
            if !admins.contains_key(&record.sys_admin_id) {
                let admin = self.get_sys_admin(record.sys_admin_id).await?;
                admins.insert(admin.id, admin.display_name());
            }
            summaries.push(RecordSummary {
                id: record.id,
                system: systems.get(&record.system_id).cloned().unwrap_or_default(),
                maintenance_type: types
                    .get(&record.maintenance_type_id)
                    .cloned()
                    .unwrap_or_default(),
                sys_admin: admins.get(&record.sys_admin_id).cloned().unwrap_or_default(),
                status: record.status,
                datetime: record.datetime,
            });
        }
        Ok(summaries)
    }

    // ===== Documentation Records =====

    pub async fn create_documentation(
        &self,
        input: DocumentationInput,
    ) -> Result<DocumentationRecord, MaintenanceError> {
        let (record, linked) = self.build_documentation(None, input).await?;
        let created = self
            .repos
            .documentation
            .create(&record, linked.as_deref())
            .await
            .map_err(storage("create documentation record"))?;
        tracing::info!(documentation_id = created.id, title = %created.title, "documentation record created");
        Ok(created)
    }

    /// Update a document; `maintenance_record_ids`, when set, replaces the linking records
    pub async fn update_documentation(
        &self,
        id: Id,
        input: DocumentationInput,
    ) -> Result<DocumentationRecord, MaintenanceError> {
        let current = self.get_documentation(id).await?;
        let (record, linked) = self.build_documentation(Some(current), input).await?;
        self.repos
            .documentation
            .update(&record, linked.as_deref())
            .await
            .map_err(storage("update documentation record"))
    }

    pub async fn get_documentation(&self, id: Id) -> Result<DocumentationRecord, MaintenanceError> {
        self.repos
            .documentation
            .find_by_id(id)
            .await
            .map_err(storage("get documentation record"))?
            .ok_or_else(|| MaintenanceError::not_found("documentation record", id))
    }

    /// Ids of the maintenance records linking to a document
    pub async fn documentation_record_links(&self, id: Id) -> Result<Vec<Id>, MaintenanceError> {
        self.get_documentation(id).await?;
        self.repos
            .documentation
            .linked_maintenance_record_ids(id)
            .await
            .map_err(storage("list documentation links"))
    }

    pub async fn delete_documentation(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_documentation(id).await?;
        self.repos
            .documentation
            .delete(id)
            .await
            .map_err(storage("delete documentation record"))
    }

    pub async fn list_documentation(
        &self,
        filter: &DocumentationFilter,
        page: PageRequest,
    ) -> Result<Page<DocumentationRecord>, MaintenanceError> {
        let page = self
            .repos
            .documentation
            .list_page(filter, page)
            .await
            .map_err(storage("list documentation records"))?;
        ensure_page_exists(&page)?;
        Ok(page)
    }

    pub async fn list_documentation_summaries(
        &self,
        filter: &DocumentationFilter,
        page: PageRequest,
    ) -> Result<Page<DocumentationSummary>, MaintenanceError> {
        let page = self.list_documentation(filter, page).await?;
        let items = self.summarize_documentation(&page.items).await?;
        Ok(Page {
            items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Everything shown on the documentation detail view
    pub async fn documentation_detail(
        &self,
        id: Id,
    ) -> Result<DocumentationDetail, MaintenanceError> {
        let record = self.get_documentation(id).await?;
        let maintenance_type = self.get_maintenance_type(record.maintenance_type_id).await?;
        let linked = self
            .repos
            .documentation
            .linked_maintenance_record_ids(id)
            .await
            .map_err(storage("list documentation links"))?;
        let maintenance_records = self.summaries_for(&linked).await?;
        Ok(DocumentationDetail {
            record,
            maintenance_type,
            maintenance_records,
        })
    }

    async fn build_documentation(
        &self,
        current: Option<DocumentationRecord>,
        input: DocumentationInput,
    ) -> Result<(DocumentationRecord, Option<Vec<Id>>), MaintenanceError> {
        let current_id = current.as_ref().map(|c| c.id);
        let title = validate_name("title", &input.title)?;
        let existing = self
            .repos
            .documentation
            .find_by_title(&title)
            .await
            .map_err(storage("find documentation record"))?;
        if let Some(existing) = existing {
            if Some(existing.id) != current_id {
                return Err(MaintenanceError::conflict(format!(
                    "Documentation record with this title '{}' already exists.",
                    title
                )));
            }
        }

        let maintenance_type = self
            .repos
            .maintenance_types
            .find_by_id(input.maintenance_type_id)
            .await
            .map_err(storage("get maintenance type"))?;
        if maintenance_type.is_none() {
            return Err(MaintenanceError::validation(
                "maintenance_type_id",
                INVALID_CHOICE,
            ));
        }

        let linked = match input.maintenance_record_ids {
            Some(ids) => {
                let ids = unique_ids(&ids);
                let found: Vec<Id> = self
                    .repos
                    .records
                    .find_many(&ids)
                    .await
                    .map_err(storage("find maintenance records"))?
                    .into_iter()
                    .map(|r| r.id)
                    .collect();
                if found.len() != ids.len() {
                    return Err(missing_choices("maintenance_record_ids", &ids, &found));
                }
                Some(ids)
            }
            None => None,
        };

        let documentation = render_markup("documentation", &input.documentation)?;
        let now = Utc::now();
        let record = DocumentationRecord {
            id: current_id.unwrap_or(0),
            title,
            maintenance_type_id: input.maintenance_type_id,
            documentation,
            created_at: current.map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
        };
        Ok((record, linked))
    }

    async fn summarize_documentation(
        &self,
        records: &[DocumentationRecord],
    ) -> Result<Vec<DocumentationSummary>, MaintenanceError> {
        let mut types: HashMap<Id, String> = HashMap::new();
        let mut summaries = Vec::with_capacity(records.len());
        for record in records {
            if !types.contains_key(&record.maintenance_type_id) {
                let found = self.get_maintenance_type(record.maintenance_type_id).await?;
                types.insert(found.id, found.maintenance_type);
            }
            summaries.push(DocumentationSummary {
                id: record.id,
                title: record.title.clone(),
                maintenance_type: types
                    .get(&record.maintenance_type_id)
                    .cloned()
                    .unwrap_or_default(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            });
        }
        Ok(summaries)
    }

    // ===== Relationships =====

    /// Record that `referencing_record_id` references `referenced_record_id`
    pub async fn add_relationship(
        &self,
        referencing_record_id: Id,
        referenced_record_id: Id,
    ) -> Result<RecordRelationship, MaintenanceError> {
        validate_relationship(referencing_record_id, referenced_record_id)?;

        for (field, id) in [
            ("referencing_record_id", referencing_record_id),
            ("referenced_record_id", referenced_record_id),
        ] {
            let record = self
                .repos
                .records
                .find_by_id(id)
                .await
                .map_err(storage("get maintenance record"))?;
            if record.is_none() {
                return Err(MaintenanceError::validation(field, INVALID_CHOICE));
            }
        }

        let existing = self
            .repos
            .relationships
            .find_by_pair(referencing_record_id, referenced_record_id)
            .await
            .map_err(storage("find relationship"))?;
        if existing.is_some() {
            return Err(MaintenanceError::conflict(
                "Maintenance record relationship with this Referencing record and Referenced record already exists.",
            ));
        }

        let relationship = self
            .repos
            .relationships
            .create(referencing_record_id, referenced_record_id)
            .await
            .map_err(storage("create relationship"))?;
        tracing::info!(
            relationship_id = relationship.id,
            referencing_record_id,
            referenced_record_id,
            "relationship added"
        );
        Ok(relationship)
    }

    pub async fn get_relationship(&self, id: Id) -> Result<RecordRelationship, MaintenanceError> {
        self.repos
            .relationships
            .find_by_id(id)
            .await
            .map_err(storage("get relationship"))?
            .ok_or_else(|| MaintenanceError::not_found("relationship", id))
    }

    /// All edges with both endpoints labelled
    pub async fn list_relationships(&self) -> Result<Vec<RelationshipSummary>, MaintenanceError> {
        let edges = self
            .repos
            .relationships
            .list_all()
            .await
            .map_err(storage("list relationships"))?;

        let mut ids: Vec<Id> = edges
            .iter()
            .flat_map(|e| [e.referencing_record_id, e.referenced_record_id])
            .collect();
        ids = unique_ids(&ids);
        let summaries: HashMap<Id, RecordSummary> = self
            .summaries_for(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut out = Vec::with_capacity(edges.len());
        for relationship in edges {
            let (Some(referencing), Some(referenced)) = (
                summaries.get(&relationship.referencing_record_id),
                summaries.get(&relationship.referenced_record_id),
            ) else {
                continue;
            };
            out.push(RelationshipSummary {
                relationship,
                referencing: referencing.clone(),
                referenced: referenced.clone(),
            });
        }
        Ok(out)
    }

    pub async fn delete_relationship(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_relationship(id).await?;
        self.repos
            .relationships
            .delete(id)
            .await
            .map_err(storage("delete relationship"))
    }

    // ===== Raw markup =====

    /// Unrendered source of one markup field; unknown fields are not found
    pub async fn raw_field(
        &self,
        kind: RawRecordKind,
        field_name: &str,
        id: Id,
    ) -> Result<RawField, MaintenanceError> {
        match kind {
            RawRecordKind::Documentation => {
                if field_name != "documentation" {
                    return Err(MaintenanceError::not_found("field", field_name));
                }
                let record = self.get_documentation(id).await?;
                Ok(RawField {
                    kind,
                    record_id: id,
                    record_label: record.title,
                    field_name: field_name.to_string(),
                    markup_type: record.documentation.markup_type,
                    raw: record.documentation.raw,
                })
            }
            RawRecordKind::Maintenance => {
                if !RECORD_MARKUP_FIELDS.contains(&field_name) {
                    return Err(MaintenanceError::not_found("field", field_name));
                }
                let record = self.get_record(id).await?;
                let label = self.summarize(std::slice::from_ref(&record)).await?;
                let text = match field_name {
                    "description" => record.description,
                    "procedure" => record.procedure,
                    _ => record.problems,
                };
                Ok(RawField {
                    kind,
                    record_id: id,
                    record_label: label.first().map(|s| s.label()).unwrap_or_default(),
                    field_name: field_name.to_string(),
                    markup_type: text.markup_type,
                    raw: text.raw,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_past_end_is_not_found() {
        let page: Page<i32> = Page {
            items: vec![],
            total: 5,
            page: 2,
            per_page: 10,
        };
        assert!(matches!(
            ensure_page_exists(&page),
            Err(MaintenanceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_first_page_of_empty_listing_exists() {
        let page: Page<i32> = Page {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert!(ensure_page_exists(&page).is_ok());
    }

    #[test]
    fn test_missing_choices_names_first_unknown_id() {
        let err = missing_choices("hardware_ids", &[1, 2, 3], &[1, 3]);
        assert_eq!(
            err,
            MaintenanceError::validation(
                "hardware_ids",
                "Select a valid choice. 2 is not one of the available choices."
            )
        );
    }
}
