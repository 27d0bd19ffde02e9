//! Auth module: domain, persistence capabilities, repositories, service.
//!
//! `AuthService` only talks to `UserSaver`, `UserProvider` and `AppProvider`;
//! storage errors are classified into `AuthErrorKind` before they reach it.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use errors::{AuthError, AuthErrorKind};
pub use service::{Auth, AuthConfig, AuthService};
