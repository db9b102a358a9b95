/// Database models and their row-level operations
///
/// - `product`: catalog products keyed by slug (upsert, delete)
/// - `user`: accounts and identity lookups
/// - `account`: upload profile, subscription, one-time purchases
/// - `request`: custom product requests, quotes, orders
/// - `newsletter`: newsletter subscribers

pub mod account;
pub mod newsletter;
pub mod product;
pub mod request;
pub mod user;
