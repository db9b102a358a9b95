/// robots.txt for whichever host the request came in on
///
/// The storefront is served under several domains (preview deployments,
/// custom domains), so the sitemap URL is built from the request host:
/// `X-Forwarded-Host` first (set by the edge proxy), then `Host`. A value
/// that is not a plausible `host[:port]` is ignored and the configured site
/// domain is used instead.

use crate::app::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
};

const ALLOW: &[&str] = &["/", "/products/", "/custom/"];

const DISALLOW: &[&str] = &[
    "/api/",
    "/admin/",
    "/account/",
    "/checkout/",
    "/auth/",
    "/email-diagnostics",
    "/test-email",
];

/// robots.txt handler
pub async fn robots_txt(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = request_host(&headers).unwrap_or_else(|| state.config.site.domain.clone());

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        render(&host),
    )
}

/// First valid host from the forwarding or Host header
fn request_host(headers: &HeaderMap) -> Option<String> {
    [header::HeaderName::from_static("x-forwarded-host"), header::HOST]
        .iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        // proxies may append their own entry
        .filter_map(|value| value.split(',').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .find(|host| is_valid_host(host))
}

fn is_valid_host(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (host, None),
    };

    if let Some(port) = port {
        if port.is_empty() || port.len() > 5 || !port.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    !name.is_empty()
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// `http` for local development hosts, `https` everywhere else
fn scheme_for(host: &str) -> &'static str {
    let name = host.split(':').next().unwrap_or(host);
    if name == "localhost" || name == "127.0.0.1" {
        "http"
    } else {
        "https"
    }
}

fn render(host: &str) -> String {
    let mut body = String::from("User-agent: *\n");
    for path in ALLOW {
        body.push_str(&format!("Allow: {}\n", path));
    }
    for path in DISALLOW {
        body.push_str(&format!("Disallow: {}\n", path));
    }
    body.push_str(&format!("\nSitemap: {}://{}/sitemap.xml\n", scheme_for(host), host));
    body
}
