//! HTTP API handlers for fyyur-server

pub mod artists;
pub mod extract;
pub mod flash;
pub mod health;
pub mod shows;
pub mod venues;

use axum::http::Uri;
use serde::Deserialize;

use crate::ApiError;

pub use artists::artist_routes;
pub use extract::{EntityPath, FormJson, SearchBody};
pub use flash::Flash;
pub use health::health_routes;
pub use shows::show_routes;
pub use venues::venue_routes;

/// Url-encoded search submission
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

/// Fallback for unrouted paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
