pub mod auth;
pub mod client;
pub mod router;
pub mod session;
pub mod state;
pub mod students;
pub mod templates;

use axum::{
    http::{HeaderValue, header},
    response::Response,
};

pub use state::PortalState;

/// Responses produced without a session token must not be cached: after a
/// logout the back button would otherwise replay protected pages.
pub(crate) fn with_no_store(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
