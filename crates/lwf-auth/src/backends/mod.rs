//! Authentication backends.

mod memory;

pub use memory::MemoryBackend;

use chrono::Utc;

use crate::error::{AuthError, Result};
use crate::user::{AuthState, User};

/// Checks a login and password against some user store.
pub trait Authenticator: Send + Sync {
    /// Returns the matching user, or `None` when the credentials are wrong.
    fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>>;

    /// Authenticates and marks the user as fully authenticated.
    fn login(&self, login: &str, password: &str) -> Result<User> {
        let mut user = self
            .authenticate(login, password)?
            .ok_or(AuthError::InvalidCredentials)?;
        user.set_authenticated(AuthState::FullyAuthenticated);
        user.last_login = Some(Utc::now());
        tracing::debug!(login, "user logged in");
        Ok(user)
    }
}
