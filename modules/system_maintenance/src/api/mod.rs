//! Transport layer: HTML views and the admin console

pub mod rest;
pub mod session;
pub mod web;
