//! URL building for the HTML views

use crate::contract::{Id, RawRecordKind};

/// URLs of the HTML views and admin console, relative to their mount points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    mount: String,
    admin: String,
}

impl Paths {
    /// Both prefixes without a trailing slash; "" mounts at the root
    pub fn new(mount: impl Into<String>, admin: impl Into<String>) -> Self {
        Self {
            mount: mount.into(),
            admin: admin.into(),
        }
    }

    /// Path below the mount point, e.g. `route("records/")`
    pub fn route(&self, suffix: &str) -> String {
        format!("{}/{}", self.mount, suffix)
    }

    pub fn home(&self) -> String {
        self.route("")
    }

    pub fn login(&self) -> String {
        self.route("authentication/")
    }

    /// Login URL that returns to `next` afterwards
    pub fn login_with_next(&self, next: &str) -> String {
        format!("{}?next={}", self.login(), urlencoding::encode(next))
    }

    pub fn logout(&self) -> String {
        self.route("logout/")
    }

    pub fn documentation_list(&self) -> String {
        self.route("documentation/")
    }

    pub fn documentation(&self, id: Id) -> String {
        self.route(&format!("documentation/{}/", id))
    }

    pub fn records(&self) -> String {
        self.route("records/")
    }

    pub fn record(&self, id: Id) -> String {
        self.route(&format!("records/{}/", id))
    }

    pub fn raw(&self, kind: RawRecordKind, field_name: &str, id: Id) -> String {
        self.route(&format!("raw/{}/{}/{}/", kind.path_segment(), field_name, id))
    }

    /// Admin console collection, e.g. `admin("systems")`
    pub fn admin(&self, collection: &str) -> String {
        format!("{}/{}", self.admin, collection)
    }

    /// Accept only same-site absolute paths as a post-login destination
    pub fn safe_next(&self, next: Option<&str>) -> String {
        match next.map(str::trim) {
            Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
                next.to_string()
            }
            _ => self.home(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_mount() {
        let paths = Paths::new("", "/admin");
        assert_eq!(paths.home(), "/");
        assert_eq!(paths.record(3), "/records/3/");
        assert_eq!(
            paths.raw(RawRecordKind::Maintenance, "procedure", 3),
            "/raw/maintenance/procedure/3/"
        );
        assert_eq!(paths.admin("systems"), "/admin/systems");
    }

    #[test]
    fn test_prefixed_mount() {
        let paths = Paths::new("/maintenance", "/admin");
        assert_eq!(paths.home(), "/maintenance/");
        assert_eq!(paths.login(), "/maintenance/authentication/");
    }

    #[test]
    fn test_login_with_next_encodes() {
        let paths = Paths::new("", "/admin");
        assert_eq!(
            paths.login_with_next("/records/?page=2"),
            "/authentication/?next=%2Frecords%2F%3Fpage%3D2"
        );
    }

    #[test]
    fn test_safe_next() {
        let paths = Paths::new("", "/admin");
        assert_eq!(paths.safe_next(Some("/records/1/")), "/records/1/");
        assert_eq!(paths.safe_next(Some("//evil.example/")), "/");
        assert_eq!(paths.safe_next(Some("https://evil.example/")), "/");
        assert_eq!(paths.safe_next(Some("")), "/");
        assert_eq!(paths.safe_next(None), "/");
    }
}
