//! Account operations behind the authorization gate.
//!
//! Every operation except registration and the credential exchange takes the
//! caller's API key explicitly and authorizes it before touching the store.
//! Writes that create records are scoped to the authenticated identity, never
//! to identifiers taken from the request.

use std::sync::Arc;

use chrono::Duration;

use satellite_auth::{Authorization, AuthorizationGate, Clock, Signer, default_token_ttl};
use satellite_core::{ProjectId, UserId};

use crate::error::AccountError;
use crate::model::{
    CURRENT_TERMS_VERSION, Company, CompanyInfo, Project, ProjectInfo, ProjectSummary, User,
    UserInfo, normalize_email,
};
use crate::password::{hash_password, verify_against_dummy, verify_password};
use crate::store::{AccountStore, StoreError, UserDirectory};

/// Which records an authenticated caller may address by id.
///
/// `AnyAuthenticated` keeps the long-standing behaviour: any valid token may
/// read, update or delete any user, company or project by id, and project
/// listing returns every project. `OwnerOnly` restricts those operations to
/// the caller's own user record, company and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    #[default]
    AnyAuthenticated,
    OwnerOnly,
}

pub struct AccountService<D> {
    store: D,
    gate: AuthorizationGate<UserDirectory<D>>,
    token_ttl: Duration,
    access: AccessPolicy,
}

impl<D> AccountService<D>
where
    D: AccountStore + Clone,
{
    pub fn new(signer: Arc<dyn Signer>, store: D) -> Self {
        let gate = AuthorizationGate::new(signer, UserDirectory::new(store.clone()));
        Self {
            store,
            gate,
            token_ttl: default_token_ttl(),
            access: AccessPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.gate = self.gate.with_clock(clock);
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_access_policy(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    pub fn gate(&self) -> &AuthorizationGate<UserDirectory<D>> {
        &self.gate
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.access
    }

    /// Resolve the caller behind `api_key`.
    pub fn authorize(&self, api_key: Option<&str>) -> Result<Authorization<User>, AccountError> {
        Ok(self.gate.authorize_credential(api_key)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bootstrap (un-gated)
    // ─────────────────────────────────────────────────────────────────────

    /// Register a user and their company.
    ///
    /// A failure to store the company is logged and does not undo the user.
    pub fn create_user(&self, info: UserInfo, company: CompanyInfo) -> Result<User, AccountError> {
        info.validate_new()?;

        let user = User {
            id: UserId::new(),
            email: info.normalized_email(),
            first_name: info.first_name,
            last_name: info.last_name,
            password_hash: hash_password(&info.password)?,
            created_at: self.gate.now(),
        };
        let user = self.store.users().insert(user)?;
        tracing::info!(user_id = %user.id, "user created");

        let company = company.into_company(user.id, self.gate.now());
        if let Err(err) = self.store.companies().insert(company) {
            tracing::warn!(user_id = %user.id, error = %err, "failed to create company for new user");
        }

        Ok(user)
    }

    /// Exchange email and password for a token. An unknown email still pays
    /// for one password verification.
    pub fn token(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let user = match self.store.users().get_by_email(&normalize_email(email)) {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                verify_against_dummy(password);
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => return Err(AccountError::Store(e)),
        };

        if !verify_password(password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "credential exchange rejected");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(self.gate.issue(user.id, self.token_ttl)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn get_user(&self, api_key: Option<&str>, id: UserId) -> Result<User, AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, id)?;

        Ok(self.store.users().get(&id)?)
    }

    /// Replace a user's profile. An empty password keeps the current hash.
    pub fn update_user(
        &self,
        api_key: Option<&str>,
        id: UserId,
        info: UserInfo,
    ) -> Result<(), AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, id)?;
        info.validate_email()?;

        let current = self.store.users().get(&id)?;
        let password_hash = if info.password.is_empty() {
            current.password_hash
        } else {
            hash_password(&info.password)?
        };

        self.store.users().update(User {
            id,
            email: info.normalized_email(),
            first_name: info.first_name,
            last_name: info.last_name,
            password_hash,
            created_at: current.created_at,
        })?;
        tracing::info!(user_id = %id, actor = %auth.user.id, "user updated");
        Ok(())
    }

    pub fn delete_user(&self, api_key: Option<&str>, id: UserId) -> Result<(), AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, id)?;

        self.store.users().delete(&id)?;
        tracing::info!(user_id = %id, actor = %auth.user.id, "user deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Companies
    // ─────────────────────────────────────────────────────────────────────

    /// Create the caller's company.
    pub fn create_company(
        &self,
        api_key: Option<&str>,
        info: CompanyInfo,
    ) -> Result<Company, AccountError> {
        let auth = self.authorize(api_key)?;

        let company = info.into_company(auth.user.id, self.gate.now());
        let company = self.store.companies().insert(company)?;
        tracing::info!(user_id = %auth.user.id, "company created");
        Ok(company)
    }

    pub fn get_company(
        &self,
        api_key: Option<&str>,
        user_id: UserId,
    ) -> Result<Company, AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, user_id)?;

        Ok(self.store.companies().get_by_user_id(&user_id)?)
    }

    pub fn update_company(
        &self,
        api_key: Option<&str>,
        user_id: UserId,
        info: CompanyInfo,
    ) -> Result<(), AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, user_id)?;

        let current = self.store.companies().get_by_user_id(&user_id)?;
        self.store
            .companies()
            .update(info.into_company(user_id, current.created_at))?;
        tracing::info!(user_id = %user_id, actor = %auth.user.id, "company updated");
        Ok(())
    }

    pub fn delete_company(&self, api_key: Option<&str>, user_id: UserId) -> Result<(), AccountError> {
        let auth = self.authorize(api_key)?;
        self.ensure_may_address_user(&auth, user_id)?;

        self.store.companies().delete(&user_id)?;
        tracing::info!(user_id = %user_id, actor = %auth.user.id, "company deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────

    pub fn get_project(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
    ) -> Result<Project, AccountError> {
        let auth = self.authorize(api_key)?;

        let project = self.store.projects().get(&project_id)?;
        self.ensure_may_address_project(&auth, &project)?;
        Ok(project)
    }

    /// Projects visible to the caller, with owner names resolved.
    pub fn list_projects(&self, api_key: Option<&str>) -> Result<Vec<ProjectSummary>, AccountError> {
        let auth = self.authorize(api_key)?;

        let projects = match self.access {
            AccessPolicy::AnyAuthenticated => self.store.projects().get_all()?,
            AccessPolicy::OwnerOnly => self.store.projects().get_by_owner(&auth.user.id)?,
        };

        Ok(projects
            .into_iter()
            .map(|project| self.summarize(project, &auth.user))
            .collect())
    }

    /// Create a project owned by the caller.
    ///
    /// Fails with `TermsNotAccepted`, without writing anything, unless the
    /// request explicitly accepts the terms of use. Any owner supplied in the
    /// request is ignored.
    pub fn create_project(
        &self,
        api_key: Option<&str>,
        info: ProjectInfo,
    ) -> Result<Project, AccountError> {
        let auth = self.authorize(api_key)?;

        if !info.is_terms_accepted {
            return Err(AccountError::TermsNotAccepted);
        }

        if let Some(requested) = info.owner_id.filter(|owner| *owner != auth.user.id) {
            tracing::info!(requested_owner = %requested, actor = %auth.user.id, "ignoring requested project owner");
        }

        let project = Project {
            id: ProjectId::new(),
            owner_id: Some(auth.user.id),
            name: info.name,
            description: info.description,
            terms_accepted: CURRENT_TERMS_VERSION,
            created_at: self.gate.now(),
        };
        let project = self.store.projects().insert(project)?;
        tracing::info!(project_id = %project.id, owner = %auth.user.id, "project created");
        Ok(project)
    }

    /// Change a project's description. Nothing else is updatable.
    pub fn update_project(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
        description: String,
    ) -> Result<Project, AccountError> {
        let auth = self.authorize(api_key)?;

        let mut project = self.store.projects().get(&project_id)?;
        self.ensure_may_address_project(&auth, &project)?;

        project.description = description;
        self.store.projects().update(project.clone())?;
        tracing::info!(project_id = %project_id, actor = %auth.user.id, "project updated");
        Ok(project)
    }

    pub fn delete_project(
        &self,
        api_key: Option<&str>,
        project_id: ProjectId,
    ) -> Result<(), AccountError> {
        let auth = self.authorize(api_key)?;

        let project = self.store.projects().get(&project_id)?;
        self.ensure_may_address_project(&auth, &project)?;

        self.store.projects().delete(&project_id)?;
        tracing::info!(project_id = %project_id, actor = %auth.user.id, "project deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn ensure_may_address_user(
        &self,
        auth: &Authorization<User>,
        target: UserId,
    ) -> Result<(), AccountError> {
        match self.access {
            AccessPolicy::AnyAuthenticated => Ok(()),
            AccessPolicy::OwnerOnly if auth.user.id == target => Ok(()),
            AccessPolicy::OwnerOnly => Err(AccountError::Forbidden),
        }
    }

    fn ensure_may_address_project(
        &self,
        auth: &Authorization<User>,
        project: &Project,
    ) -> Result<(), AccountError> {
        match self.access {
            AccessPolicy::AnyAuthenticated => Ok(()),
            AccessPolicy::OwnerOnly if project.owner_id == Some(auth.user.id) => Ok(()),
            AccessPolicy::OwnerOnly => Err(AccountError::Forbidden),
        }
    }

    /// Owner lookups that fail leave the owner name empty.
    fn summarize(&self, project: Project, caller: &User) -> ProjectSummary {
        let owner = match project.owner_id {
            Some(owner_id) if owner_id == caller.id => Some(caller.clone()),
            Some(owner_id) => self.store.users().get(&owner_id).ok(),
            None => None,
        };
        ProjectSummary::from_project(project, owner.as_ref())
    }
}
