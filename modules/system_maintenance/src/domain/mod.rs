//! Domain layer - business logic and services

pub mod auth;
pub mod markup;
pub mod repository;
pub mod service;
pub mod validation;

pub use repository::Repositories;
pub use service::Service;
