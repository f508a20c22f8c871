use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satellite_accounts::{CompanyInfo, User, UserInfo};
use satellite_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

/// Registration body: the user plus their (optional) company details.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user: UserInfo,
    #[serde(default)]
    pub company: CompanyInfo,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub description: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    /// `None` for tokens that never expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl WhoAmIResponse {
    pub fn new(user: &User, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.full_name(),
            expires_at,
        }
    }
}
