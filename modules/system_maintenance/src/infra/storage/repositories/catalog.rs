use super::{search_term, unique};
use crate::contract::{Hardware, Id, MaintenanceType, Software, System};
use crate::domain::repository::{
    HardwareRepository, MaintenanceTypeRepository, SoftwareRepository, SystemRepository,
};
use crate::infra::storage::entity::{
    hardware, maintenance_types, record_hardware, record_software, software, systems,
};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::sync::Arc;

// ===== System Repository =====

pub struct SeaOrmSystemRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSystemRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_SYSTEM: &str = "System with this Name already exists.";

#[async_trait]
impl SystemRepository for SeaOrmSystemRepository {
    async fn create(&self, system: &System) -> Result<System> {
        let active: systems::ActiveModel = system.into();
        let result = systems::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(DUPLICATE_SYSTEM))?;
        Ok(result.into())
    }

    async fn update(&self, system: &System) -> Result<System> {
        let active: systems::ActiveModel = system.into();
        let result = systems::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(unique(DUPLICATE_SYSTEM))?;
        Ok(result.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<System>> {
        let result = systems::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<System>> {
        let result = systems::Entity::find()
            .filter(systems::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<System>> {
        let mut query = systems::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(
                Condition::any()
                    .add(systems::Column::Name.contains(term))
                    .add(systems::Column::Description.contains(term)),
            );
        }
        let results = query
            .order_by_asc(systems::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(systems::Entity::find().count(&*self.db).await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        systems::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }
}

// ===== Hardware Repository =====

pub struct SeaOrmHardwareRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmHardwareRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_HARDWARE: &str = "Hardware with this Name already exists.";

#[async_trait]
impl HardwareRepository for SeaOrmHardwareRepository {
    async fn create(&self, name: &str) -> Result<Hardware> {
        let active = hardware::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        };
        let result = hardware::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(DUPLICATE_HARDWARE))?;
        Ok(result.into())
    }

    async fn update(&self, item: &Hardware) -> Result<Hardware> {
        let active = hardware::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
        };
        let result = hardware::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(unique(DUPLICATE_HARDWARE))?;
        Ok(result.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<Hardware>> {
        let result = hardware::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Hardware>> {
        let result = hardware::Entity::find()
            .filter(hardware::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[Id]) -> Result<Vec<Hardware>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = hardware::Entity::find()
            .filter(hardware::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(hardware::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Hardware>> {
        let mut query = hardware::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(hardware::Column::Name.contains(term));
        }
        let results = query
            .order_by_asc(hardware::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(hardware::Entity::find().count(&*self.db).await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let txn = self.db.begin().await?;
        record_hardware::Entity::delete_many()
            .filter(record_hardware::Column::HardwareId.eq(id))
            .exec(&txn)
            .await?;
        hardware::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

// ===== Software Repository =====

pub struct SeaOrmSoftwareRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSoftwareRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_SOFTWARE: &str = "Software with this Name already exists.";

#[async_trait]
impl SoftwareRepository for SeaOrmSoftwareRepository {
    async fn create(&self, name: &str) -> Result<Software> {
        let active = software::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        };
        let result = software::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(DUPLICATE_SOFTWARE))?;
        Ok(result.into())
    }

    async fn update(&self, item: &Software) -> Result<Software> {
        let active = software::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
        };
        let result = software::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(unique(DUPLICATE_SOFTWARE))?;
        Ok(result.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<Software>> {
        let result = software::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Software>> {
        let result = software::Entity::find()
            .filter(software::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[Id]) -> Result<Vec<Software>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = software::Entity::find()
            .filter(software::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(software::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Software>> {
        let mut query = software::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(software::Column::Name.contains(term));
        }
        let results = query
            .order_by_asc(software::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(software::Entity::find().count(&*self.db).await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let txn = self.db.begin().await?;
        record_software::Entity::delete_many()
            .filter(record_software::Column::SoftwareId.eq(id))
            .exec(&txn)
            .await?;
        software::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

// ===== Maintenance Type Repository =====

pub struct SeaOrmMaintenanceTypeRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMaintenanceTypeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_MAINTENANCE_TYPE: &str = "Maintenance type with this label already exists.";

#[async_trait]
impl MaintenanceTypeRepository for SeaOrmMaintenanceTypeRepository {
    async fn create(&self, maintenance_type: &MaintenanceType) -> Result<MaintenanceType> {
        let active: maintenance_types::ActiveModel = maintenance_type.into();
        let result = maintenance_types::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(DUPLICATE_MAINTENANCE_TYPE))?;
        Ok(result.into())
    }

    async fn update(&self, maintenance_type: &MaintenanceType) -> Result<MaintenanceType> {
        let active: maintenance_types::ActiveModel = maintenance_type.into();
        let result = maintenance_types::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(unique(DUPLICATE_MAINTENANCE_TYPE))?;
        Ok(result.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<MaintenanceType>> {
        let result = maintenance_types::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_label(&self, label: &str) -> Result<Option<MaintenanceType>> {
        let result = maintenance_types::Entity::find()
            .filter(maintenance_types::Column::MaintenanceType.eq(label))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<MaintenanceType>> {
        let mut query = maintenance_types::Entity::find();
        if let Some(term) = search_term(search) {
            query = query.filter(
                Condition::any()
                    .add(maintenance_types::Column::MaintenanceType.contains(term))
                    .add(maintenance_types::Column::Description.contains(term)),
            );
        }
        let results = query
            .order_by_asc(maintenance_types::Column::MaintenanceType)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(maintenance_types::Entity::find().count(&*self.db).await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        maintenance_types::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
