//! CORS Middleware Configuration
//!
//! The API speaks GET and POST only and authenticates with a bearer
//! token, so the layer admits exactly those methods and the two headers
//! browsers need to send for it.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Create CORS layer from settings. Unparseable origins are dropped;
/// with no valid origin configured the layer falls back to allowing any.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(origins)
            .max_age(std::time::Duration::from_secs(3600))
    }
}
