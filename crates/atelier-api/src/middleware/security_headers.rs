use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Response hardening settings
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    /// Extra origins artwork images may be loaded from (S3 or CDN hosts)
    pub media_origins: Vec<String>,
    pub is_production: bool,
}

impl SecurityHeadersConfig {
    pub fn new(media_origins: Vec<String>, is_production: bool) -> Self {
        Self {
            media_origins,
            is_production,
        }
    }

    fn build_csp(&self) -> String {
        let img_src = if self.media_origins.is_empty() {
            "img-src 'self' data:".to_string()
        } else {
            format!("img-src 'self' data: {}", self.media_origins.join(" "))
        };

        [
            "default-src 'self'",
            "script-src 'self'",
            "style-src 'self'",
            img_src.as_str(),
            "object-src 'none'",
            "frame-ancestors 'none'",
        ]
        .join("; ")
    }
}

/// Adds the security headers to every response.
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if config.is_production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if let Ok(value) = HeaderValue::from_str(&config.build_csp()) {
        headers.insert(header::CONTENT_SECURITY_POLICY, value);
    }

    // Media responses set their own caching.
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
