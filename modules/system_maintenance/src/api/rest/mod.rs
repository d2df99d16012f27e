//! Admin console: JSON CRUD over every entity, super-admins only

pub mod dto;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod mapper;
pub mod openapi;
pub mod routes;

use crate::domain::Service;
use std::sync::Arc;

/// Shared by the admin handlers through an `Extension`
pub struct AdminState {
    pub service: Arc<Service>,
    pub paginate_by: u64,
}
