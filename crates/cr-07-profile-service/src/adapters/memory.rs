//! In-process profile storage.

use crate::ports::{ProfileRepository, RepositoryError};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Profile, ProfileFields, ProfileId, UserId};
use std::collections::BTreeMap;

#[derive(Default)]
struct Table {
    rows: BTreeMap<ProfileId, Profile>,
    next_id: u64,
}

/// `ProfileRepository` over a locked ordered map.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    table: RwLock<Table>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn insert(&self, user_id: Option<UserId>, fields: ProfileFields) -> Result<Profile, RepositoryError> {
        let mut table = self.table.write();
        table.next_id += 1;
        let profile = Profile {
            id: ProfileId(table.next_id),
            name: fields.name,
            surname: fields.surname,
            phone_number: fields.phone_number,
            address: fields.address,
            user_id,
        };
        table.rows.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_by_owner(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn update(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut table = self.table.write();
        match table.rows.get_mut(&profile.id) {
            Some(row) => {
                *row = profile.clone();
                Ok(profile)
            }
            None => Err(RepositoryError::NotFound(profile.id)),
        }
    }

    async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError> {
        self.table
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}
