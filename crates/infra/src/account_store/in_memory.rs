use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use satellite_accounts::{
    AccountStore, Company, CompanyStore, Project, ProjectStore, StoreError, User, UserStore,
};
use satellite_core::{Entity, ProjectId, UserId};

/// Records of one kind keyed by [`Entity::id`].
#[derive(Debug)]
struct EntityTable<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Default for EntityTable<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> EntityTable<E>
where
    E: Entity + Clone,
{
    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn get(&self, id: &E::Id) -> Result<E, StoreError> {
        self.read()?.get(id).cloned().ok_or(StoreError::NotFound)
    }

    /// Values matching `keep`, in arbitrary order.
    fn filter(&self, keep: impl Fn(&E) -> bool) -> Result<Vec<E>, StoreError> {
        Ok(self.read()?.values().filter(|e| keep(e)).cloned().collect())
    }

    /// Insert a record whose id is not taken yet. `unique` rejects a clash
    /// with any existing record.
    fn insert(&self, entity: E, unique: impl Fn(&E, &E) -> bool) -> Result<E, StoreError> {
        let mut map = self.write()?;
        let id = *entity.id();
        if map.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{id} already exists")));
        }
        if map.values().any(|existing| unique(existing, &entity)) {
            return Err(StoreError::Conflict("duplicate record".to_string()));
        }
        map.insert(id, entity.clone());
        Ok(entity)
    }

    /// Replace an existing record.
    fn replace(&self, entity: E, unique: impl Fn(&E, &E) -> bool) -> Result<(), StoreError> {
        let mut map = self.write()?;
        let id = *entity.id();
        if !map.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if map
            .values()
            .any(|existing| existing.id() != &id && unique(existing, &entity))
        {
            return Err(StoreError::Conflict("duplicate record".to_string()));
        }
        map.insert(id, entity);
        Ok(())
    }

    fn remove(&self, id: &E::Id) -> Result<(), StoreError> {
        self.write()?
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

fn no_constraint<E>(_: &E, _: &E) -> bool {
    false
}

fn same_email(a: &User, b: &User) -> bool {
    a.email == b.email
}

/// In-memory account store for tests/dev.
///
/// Each repository guards its own map; no lock is held beyond a single call.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    users: InMemoryUsers,
    companies: InMemoryCompanies,
    projects: InMemoryProjects,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    fn companies(&self) -> &dyn CompanyStore {
        &self.companies
    }

    fn projects(&self) -> &dyn ProjectStore {
        &self.projects
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    table: EntityTable<User>,
}

impl UserStore for InMemoryUsers {
    fn insert(&self, user: User) -> Result<User, StoreError> {
        self.table.insert(user, same_email)
    }

    fn get(&self, id: &UserId) -> Result<User, StoreError> {
        self.table.get(id)
    }

    fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.table
            .filter(|u| u.email == email)?
            .pop()
            .ok_or(StoreError::NotFound)
    }

    fn update(&self, user: User) -> Result<(), StoreError> {
        self.table.replace(user, same_email)
    }

    fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.table.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Companies
// ─────────────────────────────────────────────────────────────────────────────

/// Keyed by the owning user, so a second company for a user is a conflict.
#[derive(Debug, Default)]
pub struct InMemoryCompanies {
    table: EntityTable<Company>,
}

impl CompanyStore for InMemoryCompanies {
    fn insert(&self, company: Company) -> Result<Company, StoreError> {
        self.table.insert(company, no_constraint)
    }

    fn get_by_user_id(&self, user_id: &UserId) -> Result<Company, StoreError> {
        self.table.get(user_id)
    }

    fn update(&self, company: Company) -> Result<(), StoreError> {
        self.table.replace(company, no_constraint)
    }

    fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.table.remove(user_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryProjects {
    table: EntityTable<Project>,
}

/// Oldest first, ties broken by id.
fn sorted(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    projects
}

impl ProjectStore for InMemoryProjects {
    fn insert(&self, project: Project) -> Result<Project, StoreError> {
        self.table.insert(project, no_constraint)
    }

    fn get(&self, id: &ProjectId) -> Result<Project, StoreError> {
        self.table.get(id)
    }

    fn get_all(&self) -> Result<Vec<Project>, StoreError> {
        Ok(sorted(self.table.filter(|_| true)?))
    }

    fn get_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError> {
        Ok(sorted(
            self.table
                .filter(|p| p.owner_id.as_ref() == Some(owner_id))?,
        ))
    }

    fn update(&self, project: Project) -> Result<(), StoreError> {
        self.table.replace(project, no_constraint)
    }

    fn delete(&self, id: &ProjectId) -> Result<(), StoreError> {
        self.table.remove(id)
    }
}
