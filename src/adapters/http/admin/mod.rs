//! Admin endpoints: plan catalog CRUD, billing settings, tenant
//! subscription administration.

mod dto;
mod handlers;
mod routes;

pub use routes::routes;
