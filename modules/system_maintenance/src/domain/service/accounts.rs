use super::{storage, Service};
use crate::contract::{
    Account, AccountUpdate, Id, MaintenanceError, NewAccount, Principal, Session,
};
use crate::domain::auth::{hash_password, verify_password};
use crate::domain::validation::{validate_password, validate_username};
use chrono::Utc;
use uuid::Uuid;

impl Service {
    // ===== Account Operations =====

    pub async fn create_account(&self, new: NewAccount) -> Result<Account, MaintenanceError> {
        let username = validate_username(&new.username)?;
        validate_password(&new.password)?;
        self.ensure_username_free(&username, None).await?;

        let account = Account {
            id: 0,
            username,
            password_hash: hash_password(&new.password).map_err(storage("hash password"))?,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: new.email.trim().to_string(),
            is_active: new.is_active,
            is_superuser: new.is_superuser,
            date_joined: Utc::now(),
        };
        let created = self
            .repos
            .accounts
            .create(&account)
            .await
            .map_err(storage("create account"))?;
        tracing::info!(account_id = created.id, username = %created.username, "account created");
        Ok(created)
    }

    pub async fn update_account(
        &self,
        id: Id,
        update: AccountUpdate,
    ) -> Result<Account, MaintenanceError> {
        let mut account = self.get_account(id).await?;

        if let Some(username) = update.username {
            let username = validate_username(&username)?;
            self.ensure_username_free(&username, Some(id)).await?;
            account.username = username;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            account.password_hash = hash_password(&password).map_err(storage("hash password"))?;
        }
        if let Some(first_name) = update.first_name {
            account.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            account.last_name = last_name.trim().to_string();
        }
        if let Some(email) = update.email {
            account.email = email.trim().to_string();
        }
        if let Some(is_active) = update.is_active {
            account.is_active = is_active;
        }
        if let Some(is_superuser) = update.is_superuser {
            account.is_superuser = is_superuser;
        }

        self.repos
            .accounts
            .update(&account)
            .await
            .map_err(storage("update account"))
    }

    pub async fn get_account(&self, id: Id) -> Result<Account, MaintenanceError> {
        self.repos
            .accounts
            .find_by_id(id)
            .await
            .map_err(storage("get account"))?
            .ok_or_else(|| MaintenanceError::not_found("account", id))
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, MaintenanceError> {
        self.repos
            .accounts
            .list_all()
            .await
            .map_err(storage("list accounts"))
    }

    /// Delete an account; refused while a SysAdmin profile is bound to it
    pub async fn delete_account(&self, id: Id) -> Result<(), MaintenanceError> {
        self.get_account(id).await?;
        let profile = self
            .repos
            .sys_admins
            .find_by_account(id)
            .await
            .map_err(storage("find sys admin"))?;
        if profile.is_some() {
            return Err(MaintenanceError::protected("account", id, "sys admin"));
        }
        self.repos
            .accounts
            .delete(id)
            .await
            .map_err(storage("delete account"))
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        current: Option<Id>,
    ) -> Result<(), MaintenanceError> {
        let existing = self
            .repos
            .accounts
            .find_by_username(username)
            .await
            .map_err(storage("find account"))?;
        match existing {
            Some(account) if Some(account.id) != current => Err(MaintenanceError::conflict(
                format!("An account with username '{}' already exists.", username),
            )),
            _ => Ok(()),
        }
    }

    // ===== Authentication =====

    /// Check credentials; inactive accounts are told apart from bad passwords
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, MaintenanceError> {
        let account = self
            .repos
            .accounts
            .find_by_username(username.trim())
            .await
            .map_err(storage("find account"))?
            .ok_or(MaintenanceError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash) {
            tracing::debug!(username = %account.username, "password mismatch");
            return Err(MaintenanceError::InvalidCredentials);
        }
        if !account.is_active {
            return Err(MaintenanceError::InactiveAccount);
        }
        Ok(account)
    }

    /// Authenticate and open a new session
    ///
    /// Expired sessions are purged on each login.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, MaintenanceError> {
        let account = self.authenticate(username, password).await?;

        let now = Utc::now();
        let purged = self
            .repos
            .sessions
            .delete_expired(now)
            .await
            .map_err(storage("purge sessions"))?;
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }

        let ttl = chrono::Duration::from_std(self.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(14));
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            account_id: account.id,
            created_at: now,
            expires_at: now + ttl,
        };
        let session = self
            .repos
            .sessions
            .create(&session)
            .await
            .map_err(storage("create session"))?;
        tracing::info!(account_id = account.id, "session opened");
        Ok(session)
    }

    /// Resolve a session token to its principal; unknown or expired tokens give `None`
    pub async fn resolve_session(&self, token: &str) -> Result<Option<Principal>, MaintenanceError> {
        let Some(session) = self
            .repos
            .sessions
            .find(token)
            .await
            .map_err(storage("find session"))?
        else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.logout(token).await?;
            return Ok(None);
        }

        let Some(account) = self
            .repos
            .accounts
            .find_by_id(session.account_id)
            .await
            .map_err(storage("get account"))?
        else {
            return Ok(None);
        };
        self.principal_for(account).await.map(Some)
    }

    /// Close a session; closing an unknown token is not an error
    pub async fn logout(&self, token: &str) -> Result<(), MaintenanceError> {
        self.repos
            .sessions
            .delete(token)
            .await
            .map_err(storage("delete session"))
    }

    /// Attach the SysAdmin profile (if any) to an account
    pub async fn principal_for(&self, account: Account) -> Result<Principal, MaintenanceError> {
        let sys_admin = self
            .repos
            .sys_admins
            .find_by_account(account.id)
            .await
            .map_err(storage("find sys admin"))?;
        Ok(Principal { account, sys_admin })
    }
}
