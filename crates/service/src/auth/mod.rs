//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, password login and token verification live here so the
//! web layer only deals with cookies and headers.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{verify_token, AuthConfig, AuthService, Claims};
