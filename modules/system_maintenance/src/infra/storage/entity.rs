//! SeaORM entities for database tables
//!
//! Markup fields are stored as three columns: raw source, markup type label
//! and the rendered HTML shadow column.

/// Login accounts
pub mod accounts {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub username: String,
        pub password_hash: String,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub is_active: bool,
        pub is_superuser: bool,
        pub date_joined: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::sys_admins::Entity")]
        SysAdmin,
    }

    impl Related<super::sys_admins::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::SysAdmin.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Login sessions keyed by opaque token
pub mod sessions {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub token: String,
        pub account_id: i32,
        pub created_at: DateTimeUtc,
        pub expires_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod systems {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "systems")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod hardware {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "hardware")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod software {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "software")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod maintenance_types {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_types")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        /// Label, e.g. "Software Installation"
        #[sea_orm(unique)]
        pub maintenance_type: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// SysAdmin profiles, at most one per account
pub mod sys_admins {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "sys_admins")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub account_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::accounts::Entity",
            from = "Column::AccountId",
            to = "super::accounts::Column::Id"
        )]
        Account,
    }

    impl Related<super::accounts::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Account.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod documentation_records {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "documentation_records")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub title: String,
        pub maintenance_type_id: i32,
        #[sea_orm(column_type = "Text")]
        pub documentation: String,
        pub documentation_markup_type: String,
        #[sea_orm(column_type = "Text")]
        pub documentation_rendered: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod maintenance_records {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_records")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub system_id: i32,
        pub sys_admin_id: i32,
        pub maintenance_type_id: i32,
        /// Status label: "Complete", "In Progress" or "Failed"
        pub status: String,
        pub datetime: DateTimeUtc,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub description_markup_type: String,
        #[sea_orm(column_type = "Text")]
        pub description_rendered: String,
        #[sea_orm(column_type = "Text")]
        pub procedure: String,
        pub procedure_markup_type: String,
        #[sea_orm(column_type = "Text")]
        pub procedure_rendered: String,
        #[sea_orm(column_type = "Text")]
        pub problems: String,
        pub problems_markup_type: String,
        #[sea_orm(column_type = "Text")]
        pub problems_rendered: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Join table: maintenance record <-> hardware
pub mod record_hardware {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_record_hardware")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub maintenance_record_id: i32,
        #[sea_orm(primary_key, auto_increment = false)]
        pub hardware_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Join table: maintenance record <-> software
pub mod record_software {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_record_software")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub maintenance_record_id: i32,
        #[sea_orm(primary_key, auto_increment = false)]
        pub software_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Join table: maintenance record <-> documentation record
pub mod record_documentation {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_record_documentation")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub maintenance_record_id: i32,
        #[sea_orm(primary_key, auto_increment = false)]
        pub documentation_record_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Directed edges between maintenance records
pub mod relationships {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "maintenance_record_relationships")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub referencing_record_id: i32,
        pub referenced_record_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::maintenance_records::Entity",
            from = "Column::ReferencingRecordId",
            to = "super::maintenance_records::Column::Id"
        )]
        Referencing,
        #[sea_orm(
            belongs_to = "super::maintenance_records::Entity",
            from = "Column::ReferencedRecordId",
            to = "super::maintenance_records::Column::Id"
        )]
        Referenced,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
