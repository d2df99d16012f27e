//! Database migrations for the system maintenance module

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_accounts::Migration),
            Box::new(m20250301_000002_create_catalog::Migration),
            Box::new(m20250301_000003_create_records::Migration),
        ]
    }
}

mod m20250301_000001_create_accounts {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_accounts"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Accounts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Accounts::Username)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Accounts::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Accounts::FirstName).string().not_null().default(""))
                        .col(ColumnDef::new(Accounts::LastName).string().not_null().default(""))
                        .col(ColumnDef::new(Accounts::Email).string().not_null().default(""))
                        .col(
                            ColumnDef::new(Accounts::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Accounts::IsSuperuser)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Accounts::DateJoined)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Sessions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sessions::Token)
                                .string_len(64)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Sessions::AccountId).integer().not_null())
                        .col(
                            ColumnDef::new(Sessions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sessions::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sessions_account")
                                .from(Sessions::Table, Sessions::AccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sessions_expires_at")
                        .table(Sessions::Table)
                        .col(Sessions::ExpiresAt)
                        .to_owned(),
                )
                .await?;

            // One SysAdmin profile per account; the unique index backs the gate lookup
            manager
                .create_table(
                    Table::create()
                        .table(SysAdmins::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SysAdmins::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SysAdmins::AccountId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sys_admins_account")
                                .from(SysAdmins::Table, SysAdmins::AccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SysAdmins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sessions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Accounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Accounts {
        Table,
        Id,
        Username,
        PasswordHash,
        FirstName,
        LastName,
        Email,
        IsActive,
        IsSuperuser,
        DateJoined,
    }

    #[derive(DeriveIden)]
    enum Sessions {
        Table,
        Token,
        AccountId,
        CreatedAt,
        ExpiresAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum SysAdmins {
        Table,
        Id,
        AccountId,
    }
}

mod m20250301_000002_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_catalog"
        }
    }

    /// `id` plus a unique `name`
    fn named_table<T: IntoIden + Copy + 'static>(table: T, id: T, name: T) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(name).string_len(255).not_null().unique_key())
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    named_table(Systems::Table, Systems::Id, Systems::Name)
                        .col(ColumnDef::new(Systems::Description).text().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(named_table(Hardware::Table, Hardware::Id, Hardware::Name))
                .await?;

            manager
                .create_table(named_table(Software::Table, Software::Id, Software::Name))
                .await?;

            manager
                .create_table(
                    named_table(
                        MaintenanceTypes::Table,
                        MaintenanceTypes::Id,
                        MaintenanceTypes::MaintenanceType,
                    )
                    .col(ColumnDef::new(MaintenanceTypes::Description).text().not_null())
                    .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenanceTypes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Software::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Hardware::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Systems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Systems {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Hardware {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Software {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum MaintenanceTypes {
        Table,
        Id,
        MaintenanceType,
        Description,
    }
}

mod m20250301_000003_create_records {
    use super::m20250301_000001_create_accounts::SysAdmins;
    use super::m20250301_000002_create_catalog::{Hardware, MaintenanceTypes, Software, Systems};
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_records"
        }
    }

    /// Composite-key join table from maintenance records to `target`
    fn join_table<T: IntoIden + Copy + 'static, U: IntoIden + Copy + 'static>(
        name: &str,
        table: T,
        record_column: T,
        target_column: T,
        target: U,
        target_id: U,
    ) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(ColumnDef::new(record_column).integer().not_null())
            .col(ColumnDef::new(target_column).integer().not_null())
            .primary_key(Index::create().col(record_column).col(target_column))
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_record", name))
                    .from(table, record_column)
                    .to(MaintenanceRecords::Table, MaintenanceRecords::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_target", name))
                    .from(table, target_column)
                    .to(target, target_id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DocumentationRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DocumentationRecords::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::Title)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::MaintenanceTypeId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::Documentation)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::DocumentationMarkupType)
                                .string_len(30)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::DocumentationRendered)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentationRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_documentation_records_maintenance_type")
                                .from(
                                    DocumentationRecords::Table,
                                    DocumentationRecords::MaintenanceTypeId,
                                )
                                .to(MaintenanceTypes::Table, MaintenanceTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            let mut records = Table::create();
            records
                .table(MaintenanceRecords::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(MaintenanceRecords::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(MaintenanceRecords::SystemId).integer().not_null())
                .col(ColumnDef::new(MaintenanceRecords::SysAdminId).integer().not_null())
                .col(
                    ColumnDef::new(MaintenanceRecords::MaintenanceTypeId)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(MaintenanceRecords::Status)
                        .string_len(50)
                        .not_null()
                        .default("In Progress"),
                )
                .col(
                    ColumnDef::new(MaintenanceRecords::Datetime)
                        .timestamp_with_time_zone()
                        .not_null(),
                );
            for (raw, markup_type, rendered) in [
                (
                    MaintenanceRecords::Description,
                    MaintenanceRecords::DescriptionMarkupType,
                    MaintenanceRecords::DescriptionRendered,
                ),
                (
                    MaintenanceRecords::Procedure,
                    MaintenanceRecords::ProcedureMarkupType,
                    MaintenanceRecords::ProcedureRendered,
                ),
                (
                    MaintenanceRecords::Problems,
                    MaintenanceRecords::ProblemsMarkupType,
                    MaintenanceRecords::ProblemsRendered,
                ),
            ] {
                records
                    .col(ColumnDef::new(raw).text().not_null())
                    .col(ColumnDef::new(markup_type).string_len(30).not_null())
                    .col(ColumnDef::new(rendered).text().not_null());
            }
            records
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_maintenance_records_system")
                        .from(MaintenanceRecords::Table, MaintenanceRecords::SystemId)
                        .to(Systems::Table, Systems::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_maintenance_records_sys_admin")
                        .from(MaintenanceRecords::Table, MaintenanceRecords::SysAdminId)
                        .to(SysAdmins::Table, SysAdmins::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_maintenance_records_maintenance_type")
                        .from(
                            MaintenanceRecords::Table,
                            MaintenanceRecords::MaintenanceTypeId,
                        )
                        .to(MaintenanceTypes::Table, MaintenanceTypes::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                );
            manager.create_table(records).await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_maintenance_records_datetime")
                        .table(MaintenanceRecords::Table)
                        .col(MaintenanceRecords::Datetime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(join_table(
                    "maintenance_record_hardware",
                    MaintenanceRecordHardware::Table,
                    MaintenanceRecordHardware::MaintenanceRecordId,
                    MaintenanceRecordHardware::HardwareId,
                    Hardware::Table,
                    Hardware::Id,
                ))
                .await?;

            manager
                .create_table(join_table(
                    "maintenance_record_software",
                    MaintenanceRecordSoftware::Table,
                    MaintenanceRecordSoftware::MaintenanceRecordId,
                    MaintenanceRecordSoftware::SoftwareId,
                    Software::Table,
                    Software::Id,
                ))
                .await?;

            manager
                .create_table(join_table(
                    "maintenance_record_documentation",
                    MaintenanceRecordDocumentation::Table,
                    MaintenanceRecordDocumentation::MaintenanceRecordId,
                    MaintenanceRecordDocumentation::DocumentationRecordId,
                    DocumentationRecords::Table,
                    DocumentationRecords::Id,
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceRecordRelationships::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceRecordRelationships::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecordRelationships::ReferencingRecordId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecordRelationships::ReferencedRecordId)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_relationships_referencing")
                                .from(
                                    MaintenanceRecordRelationships::Table,
                                    MaintenanceRecordRelationships::ReferencingRecordId,
                                )
                                .to(MaintenanceRecords::Table, MaintenanceRecords::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_relationships_referenced")
                                .from(
                                    MaintenanceRecordRelationships::Table,
                                    MaintenanceRecordRelationships::ReferencedRecordId,
                                )
                                .to(MaintenanceRecords::Table, MaintenanceRecords::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_relationships_pair")
                        .table(MaintenanceRecordRelationships::Table)
                        .col(MaintenanceRecordRelationships::ReferencingRecordId)
                        .col(MaintenanceRecordRelationships::ReferencedRecordId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(MaintenanceRecordRelationships::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(MaintenanceRecordDocumentation::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(MaintenanceRecordSoftware::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MaintenanceRecordHardware::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DocumentationRecords::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum DocumentationRecords {
        Table,
        Id,
        Title,
        MaintenanceTypeId,
        Documentation,
        DocumentationMarkupType,
        DocumentationRendered,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum MaintenanceRecords {
        Table,
        Id,
        SystemId,
        SysAdminId,
        MaintenanceTypeId,
        Status,
        Datetime,
        Description,
        DescriptionMarkupType,
        DescriptionRendered,
        Procedure,
        ProcedureMarkupType,
        ProcedureRendered,
        Problems,
        ProblemsMarkupType,
        ProblemsRendered,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum MaintenanceRecordHardware {
        Table,
        MaintenanceRecordId,
        HardwareId,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum MaintenanceRecordSoftware {
        Table,
        MaintenanceRecordId,
        SoftwareId,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum MaintenanceRecordDocumentation {
        Table,
        MaintenanceRecordId,
        DocumentationRecordId,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum MaintenanceRecordRelationships {
        Table,
        Id,
        ReferencingRecordId,
        ReferencedRecordId,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        Database::connect(opts).await.unwrap()
    }

    #[test]
    fn test_migration_names_are_unique() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "m20250301_000001_create_accounts",
                "m20250301_000002_create_catalog",
                "m20250301_000003_create_records",
            ]
        );
    }

    #[tokio::test]
    async fn test_up_records_every_version() {
        let db = memory_db().await;
        Migrator::up(&db, None).await.unwrap();

        let applied = Migrator::get_applied_migrations(&db).await.unwrap();
        let versions: Vec<&str> = applied.iter().map(|m| m.name()).collect();
        assert_eq!(versions.len(), 3);
        assert!(versions.contains(&"m20250301_000003_create_records"));
    }

    #[tokio::test]
    async fn test_up_twice_is_noop() {
        let db = memory_db().await;
        Migrator::up(&db, None).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let pending = Migrator::get_pending_migrations(&db).await.unwrap();
        assert!(pending.is_empty());
    }
}
