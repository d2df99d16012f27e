//! Server-rendered HTML views gated by the SysAdmin check

pub mod error;
pub mod guard;
pub mod handlers;
pub mod pages;
pub mod paths;
pub mod routes;

use crate::domain::Service;
use paths::Paths;
use std::sync::Arc;
use std::time::Duration;

/// Everything the HTML handlers need, shared through an `Extension`
pub struct WebContext {
    pub service: Arc<Service>,
    pub paths: Paths,
    pub paginate_by: u64,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
}
