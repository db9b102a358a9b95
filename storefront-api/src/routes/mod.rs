/// API route handlers
///
/// - `health`: Health check endpoint
/// - `diagnostics`: Email configuration and connectivity report
/// - `test_email`: Provider verification and test sends
/// - `robots`: Host-aware robots.txt

pub mod diagnostics;
pub mod health;
pub mod robots;
pub mod test_email;
