//! `satellite-core` — shared building blocks for the account console.
//!
//! Identifiers, the domain error model and the entity trait. No IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ProjectId, UserId};
