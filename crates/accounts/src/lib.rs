//! `satellite-accounts` — users, companies and projects behind the token gate.
//!
//! Storage is reached through the traits in [`store`]; implementations live in
//! `satellite-infra`.

pub mod error;
pub mod model;
pub mod password;
pub mod service;
pub mod store;

pub use error::AccountError;
pub use model::{Company, CompanyInfo, Project, ProjectInfo, ProjectSummary, User, UserInfo};
pub use service::{AccessPolicy, AccountService};
pub use store::{AccountStore, CompanyStore, ProjectStore, StoreError, UserDirectory, UserStore};
