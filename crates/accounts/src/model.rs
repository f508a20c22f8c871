//! Account entities and the inputs used to create/update them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satellite_core::{DomainError, DomainResult, Entity, ProjectId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 PHC string. Never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// User fields supplied on registration and update.
#[derive(Clone, Default, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Plain-text password. On update an empty value keeps the current one.
    #[serde(default)]
    pub password: String,
}

impl core::fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserInfo")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl UserInfo {
    /// Registration requires a plausible email and a password.
    pub fn validate_new(&self) -> DomainResult<()> {
        self.validate_email()?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        Ok(())
    }

    pub fn validate_email(&self) -> DomainResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("a valid email is required"));
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Company
// ─────────────────────────────────────────────────────────────────────────────

/// Billing company of a user. One per user, keyed by the owning user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub user_id: UserId,
    pub name: String,
    pub address: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Company {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

impl CompanyInfo {
    pub fn into_company(self, user_id: UserId, created_at: DateTime<Utc>) -> Company {
        Company {
            user_id,
            name: self.name,
            address: self.address,
            country: self.country,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            created_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Project
// ─────────────────────────────────────────────────────────────────────────────

/// Version of the terms of use recorded on newly created projects.
pub const CURRENT_TERMS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: Option<UserId>,
    pub name: String,
    pub description: String,
    /// Version of the terms of use accepted at creation.
    pub terms_accepted: u32,
    pub created_at: DateTime<Utc>,
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Project creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_terms_accepted: bool,
    /// Accepted on the wire but never used: the owner is always the
    /// authenticated caller.
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

/// Project as listed to clients, with the owner's display name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub owner_name: String,
    pub name: String,
    pub description: String,
    pub is_terms_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl ProjectSummary {
    pub fn from_project(project: Project, owner: Option<&User>) -> Self {
        Self {
            id: project.id,
            owner_name: owner.map(User::full_name).unwrap_or_default(),
            name: project.name,
            description: project.description,
            is_terms_accepted: project.terms_accepted > 0,
            created_at: project.created_at,
        }
    }
}
