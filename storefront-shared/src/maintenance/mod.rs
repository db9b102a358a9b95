/// Idempotent maintenance operations
///
/// - `bulk`: conditional multi-row updates with dry-run counts
/// - `resolver`: lookup-fallback user resolution
/// - `batch`: loops of independent operations that continue past failures
/// - `flag_file`: boolean flag in a dotenv-style file
///
/// The slug-keyed product upsert lives on the model,
/// see [`crate::models::product::Product::upsert`].

pub mod batch;
pub mod bulk;
pub mod flag_file;
pub mod resolver;
