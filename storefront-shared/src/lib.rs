//! # Storefront Shared Library
//!
//! Data layer and maintenance primitives shared by the storefront API and the
//! `storefront-maint` operator CLI.
//!
//! ## Module Organization
//!
//! - `db`: Connection pooling, migrations and the schema guard
//! - `models`: Database models and their queries
//! - `maintenance`: Idempotent bulk updates, user resolution, batches, flag file
//! - `email`: Outbound email transport
//! - `error`: Maintenance error taxonomy

pub mod db;
pub mod email;
pub mod error;
pub mod maintenance;
pub mod models;

/// Current version of the storefront shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
