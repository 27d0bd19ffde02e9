//! Service layer for the sso auth service.
//! - Owns the login / registration / admin-check workflow.
//! - Depends on narrow persistence capabilities, not on a concrete store.
//! - SeaORM-backed and in-memory implementations of those capabilities.

pub mod auth;
#[cfg(test)]
pub mod test_support;
