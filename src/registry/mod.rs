//! username -> `{public_key, encrypted_private_key}` document and its storage.
//!
//! Every operation loads the whole document, `register` writes it back wholesale. There is no
//! locking: one writer at a time, two processes registering at once lose the earlier write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AcryptError;
use crate::ty::KeyTuple;

mod file;
pub use file::JsonFileStore;

mod memory;
pub use memory::MemoryStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub public_key: KeyTuple,
    pub encrypted_private_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    users: BTreeMap<String, UserRecord>,
}

pub trait RegistryStore {
    fn load(&self) -> Result<Registry, AcryptError>;

    fn save(&mut self, registry: &Registry) -> Result<(), AcryptError>;
}

impl<T: RegistryStore + ?Sized> RegistryStore for &mut T {
    fn load(&self) -> Result<Registry, AcryptError> {
        (**self).load()
    }

    fn save(&mut self, registry: &Registry) -> Result<(), AcryptError> {
        (**self).save(registry)
    }
}

/// non-empty, no control characters
pub fn validate_username(username: &str) -> Result<(), AcryptError> {
    if username.trim().is_empty() {
        Err(AcryptError::InvalidInput(
            "the username can not be empty".to_string(),
        ))
    } else if username.chars().any(char::is_control) {
        Err(AcryptError::InvalidInput(format!(
            "the username `{}` contains control characters",
            username.escape_debug()
        )))
    } else {
        Ok(())
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, username: &str, record: UserRecord) -> Result<(), AcryptError> {
        validate_username(username)?;
        if self.users.contains_key(username) {
            return Err(AcryptError::DuplicateUser(username.to_string()));
        }

        self.users.insert(username.to_string(), record);
        Ok(())
    }

    pub fn get(&self, username: &str) -> Result<&UserRecord, AcryptError> {
        self.users
            .get(username)
            .ok_or_else(|| AcryptError::NotFound(username.to_string()))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserRecord)> {
        self.users.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
