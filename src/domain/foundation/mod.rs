//! Foundation module - shared value objects and error machinery.
//!
//! # Module Structure
//!
//! - `ids` - Strongly-typed identifiers (TenantId, PlanSlug, EmailAddress)
//! - `timestamp` - Immutable UTC timestamp value object
//! - `errors` - DomainError, ErrorCode, ValidationError

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{EmailAddress, PlanSlug, TenantId};
pub use timestamp::Timestamp;
