//! # Middleware
//!
//! Access logging, CORS and the security headers sent with every response.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// Only matters if the pages are ever served from another origin.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600)
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("Content-Security-Policy", "default-src 'self'"))
}
