//! Tenant-facing billing endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::routes;
