/// Middleware modules for the diagnostics server
///
/// - Security headers

pub mod security;
