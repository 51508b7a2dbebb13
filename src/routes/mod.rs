pub mod ai;
pub mod health;
pub mod jobs;
pub mod logs;
pub mod triggers;

use tower_http::cors::{Any, CorsLayer};

/// CORS for endpoints called straight from the web app: any origin, JSON POSTs.
pub fn web_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE])
}
