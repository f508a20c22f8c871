//! Storage contracts for account records.
//!
//! Implementations provide their own concurrency control; callers never hold
//! locks across these calls.

use std::sync::Arc;

use thiserror::Error;

use satellite_auth::{ResolveError, SubjectResolver};
use satellite_core::{ProjectId, UserId};

use crate::model::{Company, Project, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Uniqueness violation (duplicate id or email, second company for a user).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store could not be reached; the operation may be retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<User, StoreError>;
    fn get(&self, id: &UserId) -> Result<User, StoreError>;
    /// Lookup by normalized (trimmed, lowercase) email.
    fn get_by_email(&self, email: &str) -> Result<User, StoreError>;
    fn update(&self, user: User) -> Result<(), StoreError>;
    fn delete(&self, id: &UserId) -> Result<(), StoreError>;
}

pub trait CompanyStore: Send + Sync {
    fn insert(&self, company: Company) -> Result<Company, StoreError>;
    fn get_by_user_id(&self, user_id: &UserId) -> Result<Company, StoreError>;
    fn update(&self, company: Company) -> Result<(), StoreError>;
    fn delete(&self, user_id: &UserId) -> Result<(), StoreError>;
}

pub trait ProjectStore: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, StoreError>;
    fn get(&self, id: &ProjectId) -> Result<Project, StoreError>;
    fn get_all(&self) -> Result<Vec<Project>, StoreError>;
    fn get_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError>;
    fn update(&self, project: Project) -> Result<(), StoreError>;
    fn delete(&self, id: &ProjectId) -> Result<(), StoreError>;
}

/// Entry point to all account repositories.
pub trait AccountStore: Send + Sync {
    fn users(&self) -> &dyn UserStore;
    fn companies(&self) -> &dyn CompanyStore;
    fn projects(&self) -> &dyn ProjectStore;
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn users(&self) -> &dyn UserStore {
        (**self).users()
    }

    fn companies(&self) -> &dyn CompanyStore {
        (**self).companies()
    }

    fn projects(&self) -> &dyn ProjectStore {
        (**self).projects()
    }
}

/// Resolves token subjects against the user repository.
#[derive(Debug, Clone)]
pub struct UserDirectory<D> {
    store: D,
}

impl<D> UserDirectory<D> {
    pub fn new(store: D) -> Self {
        Self { store }
    }
}

impl<D> SubjectResolver for UserDirectory<D>
where
    D: AccountStore,
{
    type Principal = User;

    fn resolve(&self, subject: &UserId) -> Result<Option<User>, ResolveError> {
        match self.store.users().get(subject) {
            Ok(user) => Ok(Some(user)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(ResolveError::new(e.to_string())),
        }
    }
}
