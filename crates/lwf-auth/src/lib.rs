//! # lwf-auth
//!
//! Users, roles and password authentication.
//!
//! This crate provides:
//! - `User` with a login, an Argon2 password hash and a set of roles
//! - `AuthState` to tell remembered users from password-authenticated ones
//! - The `Authenticator` trait and an in-memory backend
//!
//! A [`User`] implements [`lwf_router::RoleChecker`], so it can be handed
//! straight to [`lwf_router::Router::match_request`] to enforce `_roles`.
//!
//! ## Quick Start
//!
//! ```rust
//! use lwf_auth::{Authenticator, MemoryBackend, User};
//!
//! let mut backend = MemoryBackend::new();
//! backend
//!     .insert(User::create("alice", "password123").expect("valid user").with_roles(["editor"]))
//!     .expect("has a login");
//!
//! let user = backend.login("alice", "password123").expect("valid credentials");
//! assert!(user.is_authenticated());
//! assert!(user.has_role("editor"));
//! assert!(backend.login("alice", "wrong").is_err());
//! ```

pub mod backends;
mod error;
mod password;
mod user;

pub use backends::{Authenticator, MemoryBackend};
pub use error::{AuthError, Result};
pub use password::{hash_password, validate_password, verify_password};
pub use user::{AuthState, User};
