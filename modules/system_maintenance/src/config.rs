//! Configuration for the system maintenance module

use serde::Deserialize;
use std::time::Duration;

/// System maintenance module configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path prefix for the HTML views; empty mounts them at the root
    #[serde(default)]
    pub mount_path: String,

    /// Path prefix for the admin console
    #[serde(default = "default_admin_mount_path")]
    pub admin_mount_path: String,

    /// Page size of the documentation and record listings
    #[serde(default = "default_paginate_by")]
    pub paginate_by: u64,

    /// Lifetime of a login session
    #[serde(default = "default_session_ttl", with = "humantime_serde")]
    pub session_ttl: Duration,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_path: String::new(),
            admin_mount_path: default_admin_mount_path(),
            paginate_by: default_paginate_by(),
            session_ttl: default_session_ttl(),
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Mount path without a trailing slash ("" for the root)
    pub fn mount_prefix(&self) -> String {
        normalize_prefix(&self.mount_path)
    }

    pub fn admin_prefix(&self) -> String {
        normalize_prefix(&self.admin_mount_path)
    }
}

fn normalize_prefix(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn default_admin_mount_path() -> String {
    "/admin".to_string()
}

fn default_paginate_by() -> u64 {
    10
}

fn default_session_ttl() -> Duration {
    Duration::from_secs(14 * 24 * 60 * 60) // two weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mount_prefix(), "");
        assert_eq!(config.admin_prefix(), "/admin");
        assert_eq!(config.paginate_by, 10);
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("maintenance/"), "/maintenance");
        assert_eq!(normalize_prefix("/maintenance"), "/maintenance");
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: Config =
            serde_json::from_value(serde_json::json!({ "session_ttl": "2h", "paginate_by": 25 }))
                .unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.paginate_by, 25);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<Config, _> =
            serde_json::from_value(serde_json::json!({ "paginate": 25 }));
        assert!(result.is_err());
    }
}
