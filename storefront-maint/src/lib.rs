//! # Storefront Maintenance
//!
//! Operator commands for repairing and reconciling storefront data. Every
//! command is idempotent: running it twice leaves the store as running it
//! once did.
//!
//! - `cli`: clap definitions
//! - `commands`: one function per subcommand, each taking `&PgPool`

pub mod cli;
pub mod commands;
