use super::{storage, Service};
use crate::contract::{
    EntityCounts, Hardware, Id, MaintenanceError, MaintenanceType, MaintenanceTypeInput,
    RecordReference, Software, SysAdmin, System, SystemInput,
};
use crate::domain::validation::validate_name;

impl Service {
    // ===== Systems =====

    pub async fn create_system(&self, input: SystemInput) -> Result<System, MaintenanceError> {
        let name = validate_name("name", &input.name)?;
        self.ensure_system_name_free(&name, None).await?;
        let system = System {
            id: 0,
            name,
            description: input.description,
        };
        self.repos
            .systems
            .create(&system)
            .await
            .map_err(storage("create system"))
    }

    pub async fn update_system(
        &self,
        id: Id,
        input: SystemInput,
    ) -> Result<System, MaintenanceError> {
        self.get_system(id).await?;
        let name = validate_name("name", &input.name)?;
        self.ensure_system_name_free(&name, Some(id)).await?;
        let system = System {
            id,
            name,
            description: input.description,
        };
        self.repos
            .systems
            .update(&system)
            .await
            .map_err(storage("update system"))
    }

    pub async fn get_system(&self, id: Id) -> Result<System, MaintenanceError> {
        self.repos
            .systems
            .find_by_id(id)
            .await
            .map_err(storage("get system"))?
            .ok_or_else(|| MaintenanceError::not_found("system", id))
    }

    pub async fn list_systems(&self, search: Option<&str>) -> Result<Vec<System>, MaintenanceError> {
        self.repos
            .systems
            .list(search)
            .await
            .map_err(storage("list systems"))
    }

    /// Delete a system; refused while maintenance records point at it
    pub async fn delete_system(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_system(id).await?;
        self.ensure_unreferenced("system", RecordReference::System(id))
            .await?;
        self.repos
            .systems
            .delete(id)
            .await
            .map_err(storage("delete system"))
    }

    async fn ensure_system_name_free(
        &self,
        name: &str,
        current: Option<Id>,
    ) -> Result<(), MaintenanceError> {
        let existing = self
            .repos
            .systems
            .find_by_name(name)
            .await
            .map_err(storage("find system"))?;
        match existing {
            Some(system) if Some(system.id) != current => Err(MaintenanceError::conflict(
                format!("System with this name '{}' already exists.", name),
            )),
            _ => Ok(()),
        }
    }

    // ===== Hardware =====

    pub async fn create_hardware(&self, name: &str) -> Result<Hardware, MaintenanceError> {
        let name = validate_name("name", name)?;
        self.ensure_hardware_name_free(&name, None).await?;
        self.repos
            .hardware
            .create(&name)
            .await
            .map_err(storage("create hardware"))
    }

    pub async fn update_hardware(&self, id: Id, name: &str) -> Result<Hardware, MaintenanceError> {
        self.get_hardware(id).await?;
        let name = validate_name("name", name)?;
        self.ensure_hardware_name_free(&name, Some(id)).await?;
        self.repos
            .hardware
            .update(&Hardware { id, name })
            .await
            .map_err(storage("update hardware"))
    }

    pub async fn get_hardware(&self, id: Id) -> Result<Hardware, MaintenanceError> {
        self.repos
            .hardware
            .find_by_id(id)
            .await
            .map_err(storage("get hardware"))?
            .ok_or_else(|| MaintenanceError::not_found("hardware", id))
    }

    pub async fn list_hardware(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<Hardware>, MaintenanceError> {
        self.repos
            .hardware
            .list(search)
            .await
            .map_err(storage("list hardware"))
    }

    /// Delete hardware; its maintenance record associations go with it
    pub async fn delete_hardware(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_hardware(id).await?;
        self.repos
            .hardware
            .delete(id)
            .await
            .map_err(storage("delete hardware"))
    }

    async fn ensure_hardware_name_free(
        &self,
        name: &str,
        current: Option<Id>,
    ) -> Result<(), MaintenanceError> {
        let existing = self
            .repos
            .hardware
            .find_by_name(name)
            .await
            .map_err(storage("find hardware"))?;
        match existing {
            Some(hardware) if Some(hardware.id) != current => Err(MaintenanceError::conflict(
                format!("Hardware with this name '{}' already exists.", name),
            )),
            _ => Ok(()),
        }
    }

    // ===== Software =====

    pub async fn create_software(&self, name: &str) -> Result<Software, MaintenanceError> {
        let name = validate_name("name", name)?;
        self.ensure_software_name_free(&name, None).await?;
        self.repos
            .software
            .create(&name)
            .await
            .map_err(storage("create software"))
    }

    pub async fn update_software(&self, id: Id, name: &str) -> Result<Software, MaintenanceError> {
        self.get_software(id).await?;
        let name = validate_name("name", name)?;
        self.ensure_software_name_free(&name, Some(id)).await?;
        self.repos
            .software
            .update(&Software { id, name })
            .await
            .map_err(storage("update software"))
    }

    pub async fn get_software(&self, id: Id) -> Result<Software, MaintenanceError> {
        self.repos
            .software
            .find_by_id(id)
            .await
            .map_err(storage("get software"))?
            .ok_or_else(|| MaintenanceError::not_found("software", id))
    }

    pub async fn list_software(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<Software>, MaintenanceError> {
        self.repos
            .software
            .list(search)
            .await
            .map_err(storage("list software"))
    }

    pub async fn delete_software(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_software(id).await?;
        self.repos
            .software
            .delete(id)
            .await
            .map_err(storage("delete software"))
    }

    async fn ensure_software_name_free(
        &self,
        name: &str,
        current: Option<Id>,
    ) -> Result<(), MaintenanceError> {
        let existing = self
            .repos
            .software
            .find_by_name(name)
            .await
            .map_err(storage("find software"))?;
        match existing {
            Some(software) if Some(software.id) != current => Err(MaintenanceError::conflict(
                format!("Software with this name '{}' already exists.", name),
            )),
            _ => Ok(()),
        }
    }

    // ===== Maintenance Types =====

    pub async fn create_maintenance_type(
        &self,
        input: MaintenanceTypeInput,
    ) -> Result<MaintenanceType, MaintenanceError> {
        let label = validate_name("maintenance_type", &input.maintenance_type)?;
        self.ensure_maintenance_type_free(&label, None).await?;
        let maintenance_type = MaintenanceType {
            id: 0,
            maintenance_type: label,
            description: input.description,
        };
        self.repos
            .maintenance_types
            .create(&maintenance_type)
            .await
            .map_err(storage("create maintenance type"))
    }

    pub async fn update_maintenance_type(
        &self,
        id: Id,
        input: MaintenanceTypeInput,
    ) -> Result<MaintenanceType, MaintenanceError> {
        self.get_maintenance_type(id).await?;
        let label = validate_name("maintenance_type", &input.maintenance_type)?;
        self.ensure_maintenance_type_free(&label, Some(id)).await?;
        let maintenance_type = MaintenanceType {
            id,
            maintenance_type: label,
            description: input.description,
        };
        self.repos
            .maintenance_types
            .update(&maintenance_type)
            .await
            .map_err(storage("update maintenance type"))
    }

    pub async fn get_maintenance_type(&self, id: Id) -> Result<MaintenanceType, MaintenanceError> {
        self.repos
            .maintenance_types
            .find_by_id(id)
            .await
            .map_err(storage("get maintenance type"))?
            .ok_or_else(|| MaintenanceError::not_found("maintenance type", id))
    }

    pub async fn list_maintenance_types(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<MaintenanceType>, MaintenanceError> {
        self.repos
            .maintenance_types
            .list(search)
            .await
            .map_err(storage("list maintenance types"))
    }

    /// Delete a maintenance type; refused while records or documentation use it
    pub async fn delete_maintenance_type(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_maintenance_type(id).await?;
        self.ensure_unreferenced("maintenance type", RecordReference::MaintenanceType(id))
            .await?;
        let documents = self
            .repos
            .documentation
            .count_by_maintenance_type(id)
            .await
            .map_err(storage("count documentation"))?;
        if documents > 0 {
            return Err(MaintenanceError::protected(
                "maintenance type",
                id,
                "documentation record",
            ));
        }
        self.repos
            .maintenance_types
            .delete(id)
            .await
            .map_err(storage("delete maintenance type"))
    }

    async fn ensure_maintenance_type_free(
        &self,
        label: &str,
        current: Option<Id>,
    ) -> Result<(), MaintenanceError> {
        let existing = self
            .repos
            .maintenance_types
            .find_by_label(label)
            .await
            .map_err(storage("find maintenance type"))?;
        match existing {
            Some(found) if Some(found.id) != current => Err(MaintenanceError::conflict(format!(
                "Maintenance type with this label '{}' already exists.",
                label
            ))),
            _ => Ok(()),
        }
    }

    // ===== SysAdmins =====

    /// Grant SysAdmin status to an existing account
    pub async fn create_sys_admin(&self, account_id: Id) -> Result<SysAdmin, MaintenanceError> {
        let account = self
            .repos
            .accounts
            .find_by_id(account_id)
            .await
            .map_err(storage("get account"))?
            .ok_or_else(|| {
                MaintenanceError::validation(
                    "account_id",
                    "Select a valid choice. That choice is not one of the available choices.",
                )
            })?;

        let existing = self
            .repos
            .sys_admins
            .find_by_account(account.id)
            .await
            .map_err(storage("find sys admin"))?;
        if existing.is_some() {
            return Err(MaintenanceError::conflict(format!(
                "Account '{}' already has a sys admin profile.",
                account.username
            )));
        }

        let sys_admin = self
            .repos
            .sys_admins
            .create(account.id)
            .await
            .map_err(storage("create sys admin"))?;
        tracing::info!(sys_admin_id = sys_admin.id, username = %account.username, "sys admin granted");
        Ok(sys_admin)
    }

    pub async fn get_sys_admin(&self, id: Id) -> Result<SysAdmin, MaintenanceError> {
        self.repos
            .sys_admins
            .find_by_id(id)
            .await
            .map_err(storage("get sys admin"))?
            .ok_or_else(|| MaintenanceError::not_found("sys admin", id))
    }

    pub async fn list_sys_admins(&self) -> Result<Vec<SysAdmin>, MaintenanceError> {
        self.repos
            .sys_admins
            .list_all()
            .await
            .map_err(storage("list sys admins"))
    }

    /// Revoke SysAdmin status; refused while maintenance records name the sysadmin
    pub async fn delete_sys_admin(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_sys_admin(id).await?;
        self.ensure_unreferenced("sys admin", RecordReference::SysAdmin(id))
            .await?;
        self.repos
            .sys_admins
            .delete(id)
            .await
            .map_err(storage("delete sys admin"))
    }

    // ===== Shared =====

    async fn ensure_unreferenced(
        &self,
        resource: &str,
        reference: RecordReference,
    ) -> Result<(), MaintenanceError> {
        let referencing = self
            .repos
            .records
            .count_referencing(reference)
            .await
            .map_err(storage("count referencing records"))?;
        if referencing > 0 {
            let id = match reference {
                RecordReference::System(id)
                | RecordReference::SysAdmin(id)
                | RecordReference::MaintenanceType(id) => id,
            };
            return Err(MaintenanceError::protected(
                resource,
                id,
                "maintenance record",
            ));
        }
        Ok(())
    }

    /// Row counts shown on the home view
    pub async fn entity_counts(&self) -> Result<EntityCounts, MaintenanceError> {
        let repos = &self.repos;
        Ok(EntityCounts {
            systems: repos.systems.count().await.map_err(storage("count"))?,
            hardware: repos.hardware.count().await.map_err(storage("count"))?,
            software: repos.software.count().await.map_err(storage("count"))?,
            maintenance_types: repos
                .maintenance_types
                .count()
                .await
                .map_err(storage("count"))?,
            sys_admins: repos.sys_admins.count().await.map_err(storage("count"))?,
            maintenance_records: repos.records.count().await.map_err(storage("count"))?,
            documentation_records: repos
                .documentation
                .count()
                .await
                .map_err(storage("count"))?,
        })
    }
}
