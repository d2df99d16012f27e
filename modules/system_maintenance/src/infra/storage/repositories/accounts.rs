use super::unique;
use crate::contract::{Account, Id, Session, SysAdmin};
use crate::domain::repository::{AccountRepository, SessionRepository, SysAdminRepository};
use crate::infra::storage::entity::{accounts, sessions, sys_admins};
use crate::infra::storage::mapper::sys_admin_from;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use std::sync::Arc;

// ===== Account Repository =====

pub struct SeaOrmAccountRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAccountRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account> {
        let active: accounts::ActiveModel = account.into();
        let result = accounts::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(unique(DUPLICATE_USERNAME))?;

        Ok(result.into())
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let active: accounts::ActiveModel = account.into();
        let result = accounts::Entity::update(active)
            .exec(&*self.db)
            .await
            .map_err(unique(DUPLICATE_USERNAME))?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<Account>> {
        let result = accounts::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let result = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Account>> {
        let results = accounts::Entity::find()
            .order_by_asc(accounts::Column::Username)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let txn = self.db.begin().await?;
        sessions::Entity::delete_many()
            .filter(sessions::Column::AccountId.eq(id))
            .exec(&txn)
            .await?;
        accounts::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }
}

// ===== Session Repository =====

pub struct SeaOrmSessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSessionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        let active: sessions::ActiveModel = session.into();
        sessions::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;

        Ok(session.clone())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>> {
        let result = sessions::Entity::find_by_id(token.to_string())
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

// ===== SysAdmin Repository =====

pub struct SeaOrmSysAdminRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSysAdminRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SysAdminRepository for SeaOrmSysAdminRepository {
    async fn create(&self, account_id: Id) -> Result<SysAdmin> {
        let active = sys_admins::ActiveModel {
            id: NotSet,
            account_id: Set(account_id),
        };
        let result = sys_admins::Entity::insert(active)
            .exec(&*self.db)
            .await
            .map_err(unique("Sys admin with this account already exists."))?;

        self.find_by_id(result.last_insert_id)
            .await?
            .ok_or_else(|| anyhow!("sys admin {} vanished after insert", result.last_insert_id))
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<SysAdmin>> {
        let result = sys_admins::Entity::find_by_id(id)
            .find_also_related(accounts::Entity)
            .one(&*self.db)
            .await?;
        Ok(result.map(|(admin, account)| sys_admin_from(admin, account)))
    }

    async fn find_by_account(&self, account_id: Id) -> Result<Option<SysAdmin>> {
        let result = sys_admins::Entity::find()
            .filter(sys_admins::Column::AccountId.eq(account_id))
            .find_also_related(accounts::Entity)
            .one(&*self.db)
            .await?;
        Ok(result.map(|(admin, account)| sys_admin_from(admin, account)))
    }

    async fn list_all(&self) -> Result<Vec<SysAdmin>> {
        let results = sys_admins::Entity::find()
            .find_also_related(accounts::Entity)
            .order_by_asc(accounts::Column::Username)
            .all(&*self.db)
            .await?;
        Ok(results
            .into_iter()
            .map(|(admin, account)| sys_admin_from(admin, account))
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(sys_admins::Entity::find().count(&*self.db).await?)
    }

    async fn delete(&self, id: Id) -> Result<()> {
        sys_admins::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }
}
