//! Infrastructure layer: storage backends for the account service.

pub mod account_store;

pub use account_store::InMemoryAccountStore;
