//! Service layer for the store back-office.
//! - Store ownership and per-store scoping of every catalog reference.
//! - Category tree building and parent validation.
//! - Orders with transactional stock, image cleanup after commit.
//! - Registration, login and token verification.

pub mod errors;
pub mod access;
pub mod patch;
pub mod tree;
pub mod storage;
pub mod services;
pub mod auth;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
