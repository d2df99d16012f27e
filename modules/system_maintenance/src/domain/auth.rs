//! Authorization gate and password hashing

use crate::contract::Principal;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Active account with a SysAdmin profile
pub fn is_authorized(principal: &Principal) -> bool {
    principal.account.is_active && principal.sys_admin.is_some()
}

/// Authorized and holding superuser rights; unlocks the admin console
pub fn is_super_admin(principal: &Principal) -> bool {
    is_authorized(principal) && principal.account.is_superuser
}

/// Hash a password as an Argon2id PHC string (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string; unparseable hashes never match
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Account, SysAdmin};

    fn principal(is_active: bool, is_superuser: bool, sys_admin: bool) -> Principal {
        let account = Account {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_active,
            is_superuser,
            date_joined: chrono::Utc::now(),
        };
        let sys_admin = sys_admin.then(|| SysAdmin {
            id: 7,
            account_id: 1,
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        });
        Principal { account, sys_admin }
    }

    #[test]
    fn test_gate_requires_active_sysadmin() {
        assert!(is_authorized(&principal(true, false, true)));
        assert!(!is_authorized(&principal(true, false, false)));
        assert!(!is_authorized(&principal(false, false, true)));
    }

    #[test]
    fn test_super_admin_requires_gate() {
        assert!(is_super_admin(&principal(true, true, true)));
        assert!(!is_super_admin(&principal(true, false, true)));
        // superuser without a SysAdmin profile is not let in
        assert!(!is_super_admin(&principal(true, true, false)));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_password_hash_is_salted() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$salt$digest"));
        // single-round digests from older builds are not accepted
        assert!(!verify_password(
            "x",
            "sha256$00112233445566778899aabbccddeeff$2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881"
        ));
    }
}
