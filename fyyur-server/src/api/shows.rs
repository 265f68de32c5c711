//! Show endpoints

use axum::{extract::State, routing::get, Json, Router};
use fyyur_common::db;
use fyyur_common::forms::{FormSchema, ShowForm};
use fyyur_common::projections::{self, ShowListing};
use serde::Serialize;
use tracing::debug;

use super::{Flash, FormJson};
use crate::{ApiResult, AppState};

const SHOW_FAILED: &str = "An error occurred. Show could not be listed.";

#[derive(Debug, Serialize)]
pub struct ShowListResponse {
    pub shows: Vec<ShowListing>,
}

/// GET /shows
pub async fn list_shows(State(state): State<AppState>) -> ApiResult<Json<ShowListResponse>> {
    let shows = db::list_shows(&state.db)
        .await?
        .iter()
        .map(projections::show_listing)
        .collect::<fyyur_common::Result<Vec<_>>>()?;
    Ok(Json(ShowListResponse { shows }))
}

pub async fn create_show_form() -> Json<FormSchema> {
    Json(FormSchema::show())
}

/// POST /shows/create
///
/// An unknown venue or artist id is refused by the store and nothing is
/// written.
pub async fn create_show(
    State(state): State<AppState>,
    FormJson(form): FormJson<ShowForm>,
) -> Flash {
    let show = match form.validate() {
        Ok(show) => show,
        Err(e) => return Flash::rejected(e, SHOW_FAILED.to_string()),
    };

    match db::create_show(&state.db, &show).await {
        Ok(id) => {
            debug!(
                "Listed show {} (venue {}, artist {})",
                id, show.venue_id, show.artist_id
            );
            Flash::created(id, "Show was successfully listed!".to_string())
        }
        Err(e) => Flash::failed(e, SHOW_FAILED.to_string()),
    }
}

pub fn show_routes() -> Router<AppState> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", get(create_show_form).post(create_show))
}
