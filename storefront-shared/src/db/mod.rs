/// Database layer
///
/// - `pool`: PostgreSQL connection pool with explicit lifecycle
/// - `migrations`: embedded baseline schema
/// - `schema_guard`: re-runnable DDL repairs (`ensure-schema`)
///
/// Models are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
pub mod schema_guard;
