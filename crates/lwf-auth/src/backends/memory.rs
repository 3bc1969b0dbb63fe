//! In-memory authentication backend.

use std::collections::HashMap;

use crate::backends::Authenticator;
use crate::error::{AuthError, Result};
use crate::user::User;

/// Keeps users in a map keyed by login.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    users: HashMap<String, User>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a user, replacing any user with the same login.
    ///
    /// Anonymous users cannot be stored.
    pub fn insert(&mut self, user: User) -> Result<()> {
        let login = user
            .login()
            .filter(|login| !login.is_empty())
            .ok_or_else(|| AuthError::Validation("user has no login".to_string()))?
            .to_string();
        self.users.insert(login, user);
        Ok(())
    }

    pub fn get(&self, login: &str) -> Result<&User> {
        self.users
            .get(login.trim())
            .ok_or_else(|| AuthError::UserNotFound(login.to_string()))
    }

    pub fn remove(&mut self, login: &str) -> Result<User> {
        self.users
            .remove(login.trim())
            .ok_or_else(|| AuthError::UserNotFound(login.to_string()))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Authenticator for MemoryBackend {
    fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.users.get(login.trim()) else {
            return Ok(None);
        };
        if !user.check_password(password) {
            return Ok(None);
        }
        Ok(Some(user.clone()))
    }
}
