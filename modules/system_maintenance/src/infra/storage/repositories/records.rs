use super::{search_term, unique};
use crate::contract::{
    DocumentationFilter, DocumentationRecord, Id, MaintenanceRecord, Page, PageRequest,
    RecordFilter, RecordReference, RecordRelationship,
};
use crate::domain::repository::{
    DocumentationRepository, MaintenanceRecordRepository, RelationshipRepository,
};
use crate::infra::storage::entity::{
    documentation_records, maintenance_records, record_documentation, record_hardware,
    record_software, relationships,
};
use crate::infra::storage::mapper::{record_from, RecordLinks};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, RelationTrait,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Attach join-table ids to a batch of record rows, keeping their order
async fn load_records<C: ConnectionTrait>(
    db: &C,
    models: Vec<maintenance_records::Model>,
) -> Result<Vec<MaintenanceRecord>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Id> = models.iter().map(|m| m.id).collect();
    let mut links: HashMap<Id, RecordLinks> = HashMap::new();

    let rows = record_hardware::Entity::find()
        .filter(record_hardware::Column::MaintenanceRecordId.is_in(ids.clone()))
        .order_by_asc(record_hardware::Column::HardwareId)
        .all(db)
        .await?;
    for row in rows {
        links
            .entry(row.maintenance_record_id)
            .or_default()
            .hardware_ids
            .push(row.hardware_id);
    }

    let rows = record_software::Entity::find()
        .filter(record_software::Column::MaintenanceRecordId.is_in(ids.clone()))
        .order_by_asc(record_software::Column::SoftwareId)
        .all(db)
        .await?;
    for row in rows {
        links
            .entry(row.maintenance_record_id)
            .or_default()
            .software_ids
            .push(row.software_id);
    }

    let rows = record_documentation::Entity::find()
        .filter(record_documentation::Column::MaintenanceRecordId.is_in(ids))
        .order_by_asc(record_documentation::Column::DocumentationRecordId)
        .all(db)
        .await?;
    for row in rows {
        links
            .entry(row.maintenance_record_id)
            .or_default()
            .documentation_record_ids
            .push(row.documentation_record_id);
    }

    models
        .into_iter()
        .map(|model| {
            let record_links = links.remove(&model.id).unwrap_or_default();
            record_from(model, record_links)
        })
        .collect()
}

async fn clear_links<C: ConnectionTrait>(db: &C, record_id: Id) -> Result<()> {
    record_hardware::Entity::delete_many()
        .filter(record_hardware::Column::MaintenanceRecordId.eq(record_id))
        .exec(db)
        .await?;
    record_software::Entity::delete_many()
        .filter(record_software::Column::MaintenanceRecordId.eq(record_id))
        .exec(db)
        .await?;
    record_documentation::Entity::delete_many()
        .filter(record_documentation::Column::MaintenanceRecordId.eq(record_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Replace the hardware, software and documentation rows of a record
async fn replace_links<C: ConnectionTrait>(
    db: &C,
    record_id: Id,
    record: &MaintenanceRecord,
) -> Result<()> {
    clear_links(db, record_id).await?;

    if !record.hardware_ids.is_empty() {
        let rows = record.hardware_ids.iter().map(|&hardware_id| record_hardware::ActiveModel {
            maintenance_record_id: Set(record_id),
            hardware_id: Set(hardware_id),
        });
        record_hardware::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }
    if !record.software_ids.is_empty() {
        let rows = record.software_ids.iter().map(|&software_id| record_software::ActiveModel {
            maintenance_record_id: Set(record_id),
            software_id: Set(software_id),
        });
        record_software::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }
    if !record.documentation_record_ids.is_empty() {
        let rows = record
            .documentation_record_ids
            .iter()
            .map(|&documentation_record_id| record_documentation::ActiveModel {
                maintenance_record_id: Set(record_id),
                documentation_record_id: Set(documentation_record_id),
            });
        record_documentation::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Replace the set of records linking to a documentation record
async fn replace_documentation_links<C: ConnectionTrait>(
    db: &C,
    documentation_record_id: Id,
    maintenance_record_ids: &[Id],
) -> Result<()> {
    record_documentation::Entity::delete_many()
        .filter(record_documentation::Column::DocumentationRecordId.eq(documentation_record_id))
        .exec(db)
        .await?;
    if !maintenance_record_ids.is_empty() {
        let rows = maintenance_record_ids
            .iter()
            .map(|&maintenance_record_id| record_documentation::ActiveModel {
                maintenance_record_id: Set(maintenance_record_id),
                documentation_record_id: Set(documentation_record_id),
            });
        record_documentation::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

// ===== Documentation Repository =====

pub struct SeaOrmDocumentationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDocumentationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_TITLE: &str = "Documentation record with this Title already exists.";

#[async_trait]
impl DocumentationRepository for SeaOrmDocumentationRepository {
    async fn create(
        &self,
        record: &DocumentationRecord,
        maintenance_record_ids: Option<&[Id]>,
    ) -> Result<DocumentationRecord> {
        let txn = self.db.begin().await?;
        let active: documentation_records::ActiveModel = record.into();
        let created = documentation_records::Entity::insert(active)
            .exec_with_returning(&txn)
            .await
            .map_err(unique(DUPLICATE_TITLE))?;
        if let Some(ids) = maintenance_record_ids {
            replace_documentation_links(&txn, created.id, ids).await?;
        }
        txn.commit().await?;

        Ok(created.into())
    }

    async fn update(
        &self,
        record: &DocumentationRecord,
        maintenance_record_ids: Option<&[Id]>,
    ) -> Result<DocumentationRecord> {
        let txn = self.db.begin().await?;
        let active: documentation_records::ActiveModel = record.into();
        let updated = documentation_records::Entity::update(active)
            .exec(&txn)
            .await
            .map_err(unique(DUPLICATE_TITLE))?;
        if let Some(ids) = maintenance_record_ids {
            replace_documentation_links(&txn, updated.id, ids).await?;
        }
        txn.commit().await?;

        Ok(updated.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<DocumentationRecord>> {
        let result = documentation_records::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<DocumentationRecord>> {
        let result = documentation_records::Entity::find()
            .filter(documentation_records::Column::Title.eq(title))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[Id]) -> Result<Vec<DocumentationRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = documentation_records::Entity::find()
            .filter(documentation_records::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(documentation_records::Column::Title)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_page(
        &self,
        filter: &DocumentationFilter,
        page: PageRequest,
    ) -> Result<Page<DocumentationRecord>> {
        let mut query = documentation_records::Entity::find();
        if let Some(maintenance_type_id) = filter.maintenance_type_id {
            query = query
                .filter(documentation_records::Column::MaintenanceTypeId.eq(maintenance_type_id));
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(documentation_records::Column::Title.contains(term))
                    .add(documentation_records::Column::Documentation.contains(term)),
            );
        }

        let paginator = query
            .order_by_asc(documentation_records::Column::Title)
            .paginate(&*self.db, page.per_page);
        let total = paginator.num_items().await?;
        let Some(index) = page.index_within(total) else {
            return Ok(page.empty_page(total));
        };
        let items = paginator.fetch_page(index).await?;

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn linked_maintenance_record_ids(&self, id: Id) -> Result<Vec<Id>> {
        let rows = record_documentation::Entity::find()
            .filter(record_documentation::Column::DocumentationRecordId.eq(id))
            .order_by_asc(record_documentation::Column::MaintenanceRecordId)
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.maintenance_record_id).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(documentation_records::Entity::find().count(&*self.db).await?)
    }

    async fn count_by_maintenance_type(&self, maintenance_type_id: Id) -> Result<u64> {
        Ok(documentation_records::Entity::find()
            .filter(documentation_records::Column::MaintenanceTypeId.eq(maintenance_type_id))
            .count(&*self.db)
            .await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let txn = self.db.begin().await?;
        record_documentation::Entity::delete_many()
            .filter(record_documentation::Column::DocumentationRecordId.eq(id))
            .exec(&txn)
            .await?;
        documentation_records::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }
}

// ===== Maintenance Record Repository =====

pub struct SeaOrmMaintenanceRecordRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMaintenanceRecordRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaintenanceRecordRepository for SeaOrmMaintenanceRecordRepository {
    async fn create(&self, record: &MaintenanceRecord) -> Result<MaintenanceRecord> {
        let txn = self.db.begin().await?;
        let active: maintenance_records::ActiveModel = record.into();
        let created = maintenance_records::Entity::insert(active)
            .exec_with_returning(&txn)
            .await?;
        replace_links(&txn, created.id, record).await?;
        let mut loaded = load_records(&txn, vec![created]).await?;
        txn.commit().await?;

        loaded
            .pop()
            .ok_or_else(|| anyhow::anyhow!("maintenance record vanished after insert"))
    }

    async fn update(&self, record: &MaintenanceRecord) -> Result<MaintenanceRecord> {
        let txn = self.db.begin().await?;
        let active: maintenance_records::ActiveModel = record.into();
        let updated = maintenance_records::Entity::update(active).exec(&txn).await?;
        replace_links(&txn, updated.id, record).await?;
        let mut loaded = load_records(&txn, vec![updated]).await?;
        txn.commit().await?;

        loaded
            .pop()
            .ok_or_else(|| anyhow::anyhow!("maintenance record {} vanished after update", record.id))
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<MaintenanceRecord>> {
        let Some(model) = maintenance_records::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(load_records(&*self.db, vec![model]).await?.pop())
    }

    async fn find_many(&self, ids: &[Id]) -> Result<Vec<MaintenanceRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = maintenance_records::Entity::find()
            .filter(maintenance_records::Column::Id.is_in(ids.iter().copied()))
            .order_by_desc(maintenance_records::Column::Datetime)
            .order_by_desc(maintenance_records::Column::Id)
            .all(&*self.db)
            .await?;
        load_records(&*self.db, models).await
    }

    async fn list_page(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<MaintenanceRecord>> {
        let mut query = maintenance_records::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(maintenance_records::Column::Status.eq(status.label()));
        }
        if let Some(system_id) = filter.system_id {
            query = query.filter(maintenance_records::Column::SystemId.eq(system_id));
        }
        if let Some(maintenance_type_id) = filter.maintenance_type_id {
            query = query
                .filter(maintenance_records::Column::MaintenanceTypeId.eq(maintenance_type_id));
        }
        if let Some(sys_admin_id) = filter.sys_admin_id {
            query = query.filter(maintenance_records::Column::SysAdminId.eq(sys_admin_id));
        }
        if let Some(hardware_id) = filter.hardware_id {
            query = query.filter(
                maintenance_records::Column::Id.in_subquery(
                    record_hardware::Entity::find()
                        .select_only()
                        .column(record_hardware::Column::MaintenanceRecordId)
                        .filter(record_hardware::Column::HardwareId.eq(hardware_id))
                        .into_query(),
                ),
            );
        }
        if let Some(software_id) = filter.software_id {
            query = query.filter(
                maintenance_records::Column::Id.in_subquery(
                    record_software::Entity::find()
                        .select_only()
                        .column(record_software::Column::MaintenanceRecordId)
                        .filter(record_software::Column::SoftwareId.eq(software_id))
                        .into_query(),
                ),
            );
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(maintenance_records::Column::Description.contains(term))
                    .add(maintenance_records::Column::Procedure.contains(term))
                    .add(maintenance_records::Column::Problems.contains(term)),
            );
        }

        let paginator = query
            .order_by_desc(maintenance_records::Column::Datetime)
            .order_by_desc(maintenance_records::Column::Id)
            .paginate(&*self.db, page.per_page);
        let total = paginator.num_items().await?;
        let Some(index) = page.index_within(total) else {
            return Ok(page.empty_page(total));
        };
        let models = paginator.fetch_page(index).await?;

        Ok(Page {
            items: load_records(&*self.db, models).await?,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn count(&self) -> Result<u64> {
        Ok(maintenance_records::Entity::find().count(&*self.db).await?)
    }

    async fn count_referencing(&self, reference: RecordReference) -> Result<u64> {
        let condition = match reference {
            RecordReference::System(id) => maintenance_records::Column::SystemId.eq(id),
            RecordReference::SysAdmin(id) => maintenance_records::Column::SysAdminId.eq(id),
            RecordReference::MaintenanceType(id) => {
                maintenance_records::Column::MaintenanceTypeId.eq(id)
            }
        };
        Ok(maintenance_records::Entity::find()
            .filter(condition)
            .count(&*self.db)
            .await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let txn = self.db.begin().await?;
        relationships::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(relationships::Column::ReferencingRecordId.eq(id))
                    .add(relationships::Column::ReferencedRecordId.eq(id)),
            )
            .exec(&txn)
            .await?;
        clear_links(&txn, id).await?;
        maintenance_records::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

// ===== Relationship Repository =====

pub struct SeaOrmRelationshipRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRelationshipRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn relationship_from(model: relationships::Model) -> RecordRelationship {
    RecordRelationship {
        id: model.id,
        referencing_record_id: model.referencing_record_id,
        referenced_record_id: model.referenced_record_id,
    }
}

#[async_trait]
impl RelationshipRepository for SeaOrmRelationshipRepository {
    async fn create(
        &self,
        referencing_record_id: Id,
        referenced_record_id: Id,
    ) -> Result<RecordRelationship> {
        let active = relationships::ActiveModel {
            id: NotSet,
            referencing_record_id: Set(referencing_record_id),
            referenced_record_id: Set(referenced_record_id),
        };
        let created = relationships::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(
                "Maintenance record relationship with this Referencing record and Referenced record already exists.",
            ))?;
        Ok(relationship_from(created))
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<RecordRelationship>> {
        let result = relationships::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(relationship_from))
    }

    async fn find_by_pair(
        &self,
        referencing_record_id: Id,
        referenced_record_id: Id,
    ) -> Result<Option<RecordRelationship>> {
        let result = relationships::Entity::find()
            .filter(relationships::Column::ReferencingRecordId.eq(referencing_record_id))
            .filter(relationships::Column::ReferencedRecordId.eq(referenced_record_id))
            .one(&*self.db)
            .await?;
        Ok(result.map(relationship_from))
    }

    async fn list_all(&self) -> Result<Vec<RecordRelationship>> {
        let results = relationships::Entity::find()
            .join(JoinType::InnerJoin, relationships::Relation::Referencing.def())
            .order_by_desc(maintenance_records::Column::Datetime)
            .order_by_desc(maintenance_records::Column::Id)
            .order_by_asc(relationships::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(relationship_from).collect())
    }

    async fn list_for_record(&self, record_id: Id) -> Result<Vec<RecordRelationship>> {
        let results = relationships::Entity::find()
            .filter(
                Condition::any()
                    .add(relationships::Column::ReferencingRecordId.eq(record_id))
                    .add(relationships::Column::ReferencedRecordId.eq(record_id)),
            )
            .order_by_asc(relationships::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(relationship_from).collect())
    }

    async fn delete(&self, id: Id) -> Result<()> {
        relationships::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
