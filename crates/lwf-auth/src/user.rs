//! User model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use lwf_router::RoleChecker;

use crate::error::{AuthError, Result};
use crate::password::{hash_password, validate_password, verify_password};

/// How strongly the current user proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AuthState {
    #[default]
    NotAuthenticated,
    /// Identified by a remembered credential such as a cookie.
    Authenticated,
    /// Identified by a password during this session.
    FullyAuthenticated,
}

impl TryFrom<u8> for AuthState {
    type Error = AuthError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::NotAuthenticated),
            1 => Ok(Self::Authenticated),
            2 => Ok(Self::FullyAuthenticated),
            other => Err(AuthError::InvalidState(other)),
        }
    }
}

/// The user behind a request.
///
/// A user without a login is an anonymous visitor. The root user holds every
/// role.
#[derive(Debug, Clone, Default)]
pub struct User {
    login: Option<String>,
    password_hash: Option<String>,
    roles: BTreeSet<String>,
    state: AuthState,
    root: bool,
    /// Last successful password authentication.
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// An anonymous, unauthenticated user without roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a user; the password is checked and hashed.
    pub fn create(login: &str, password: &str) -> Result<Self> {
        let mut user = Self::anonymous();
        user.set_login(login);
        user.set_password(password)?;
        Ok(user)
    }

    /// Creates a user that holds every role.
    pub fn root(login: &str) -> Self {
        let mut user = Self::anonymous();
        user.set_login(login);
        user.root = true;
        user
    }

    /// Replaces the roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_roles(roles);
        self
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Sets the login, trimmed.
    pub fn set_login(&mut self, login: &str) {
        self.login = Some(login.trim().to_string());
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        validate_password(password)?;
        self.password_hash = Some(hash_password(password)?);
        Ok(())
    }

    /// Checks a password. Users without a password never match.
    pub fn check_password(&self, password: &str) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash))
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state != AuthState::NotAuthenticated
    }

    pub fn set_authenticated(&mut self, state: AuthState) {
        self.state = state;
    }

    pub fn add_role(&mut self, role: impl Into<String>) {
        self.roles.insert(role.into());
    }

    /// Removes a role the user holds.
    pub fn remove_role(&mut self, role: &str) -> Result<()> {
        if self.roles.remove(role) {
            Ok(())
        } else {
            Err(AuthError::MissingRole(role.to_string()))
        }
    }

    pub fn set_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear_roles();
        for role in roles {
            self.add_role(role);
        }
    }

    pub fn clear_roles(&mut self) {
        self.roles.clear();
    }

    /// Roles explicitly granted, sorted.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.root || self.roles.contains(role)
    }
}

impl RoleChecker for User {
    fn has_role(&self, role: &str) -> bool {
        Self::has_role(self, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_user() {
        let user = User::anonymous();
        assert_eq!(user.login(), None);
        assert!(!user.is_authenticated());
        assert!(!user.has_role("user"));
        assert!(!user.check_password(""));
    }

    #[test]
    fn test_roles() {
        let mut user = User::anonymous().with_roles(["editor", "user"]);
        assert!(user.has_role("editor"));
        assert!(!user.has_role("admin"));

        user.add_role("admin");
        assert_eq!(user.roles().collect::<Vec<_>>(), ["admin", "editor", "user"]);

        user.remove_role("editor").unwrap();
        assert!(!user.has_role("editor"));
        assert!(matches!(
            user.remove_role("editor"),
            Err(AuthError::MissingRole(role)) if role == "editor"
        ));

        user.clear_roles();
        assert_eq!(user.roles().count(), 0);
    }

    #[test]
    fn test_root_has_every_role() {
        let root = User::root("root");
        assert!(root.is_root());
        assert!(root.has_role("anything"));
        assert_eq!(root.roles().count(), 0);
    }

    #[test]
    fn test_login_is_trimmed() {
        let mut user = User::anonymous();
        user.set_login("  alice ");
        assert_eq!(user.login(), Some("alice"));
    }

    #[test]
    fn test_password() {
        let user = User::create("alice", "password123").unwrap();
        assert!(user.check_password("password123"));
        assert!(!user.check_password("password124"));
        assert!(User::create("bob", "short").is_err());
    }

    #[test]
    fn test_auth_state() {
        let mut user = User::anonymous();
        user.set_authenticated(AuthState::try_from(2).unwrap());
        assert!(user.is_authenticated());
        assert_eq!(user.state(), AuthState::FullyAuthenticated);
        assert!(matches!(
            AuthState::try_from(3),
            Err(AuthError::InvalidState(3))
        ));
    }

    #[test]
    fn test_role_checker() {
        let user = User::anonymous().with_roles(["admin"]);
        let checker: &dyn RoleChecker = &user;
        assert!(checker.has_role("admin"));
        assert!(!checker.has_role("root"));
    }
}
