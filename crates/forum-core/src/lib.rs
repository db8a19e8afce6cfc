//! # Forum Core
//!
//! The domain layer of the forum backend.
//! This crate contains the content lifecycle and access-control rules with zero
//! infrastructure dependencies: storage, hashing and token signing are reached
//! through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::ForumServices;
