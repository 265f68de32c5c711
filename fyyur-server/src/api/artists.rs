//! Artist endpoints

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use fyyur_common::db;
use fyyur_common::forms::{ArtistForm, FormSchema};
use fyyur_common::models::{Artist, EntityId};
use fyyur_common::projections::{self, ArtistDetail, EntitySummary, SearchResults};
use serde::Serialize;
use tracing::debug;

use super::{EntityPath, Flash, FormJson, SearchBody};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ArtistListResponse {
    pub artists: Vec<EntitySummary>,
}

#[derive(Debug, Serialize)]
pub struct ArtistSearchResponse {
    pub results: SearchResults,
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistEditResponse {
    pub artist: Artist,
    pub form: ArtistForm,
    pub schema: FormSchema,
}

/// GET /artists
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<ArtistListResponse>> {
    let artists = db::list_artists(&state.db).await?;
    let shows = db::list_shows(&state.db).await?;
    let artists = projections::artist_summaries(&artists, &shows, state.now())?;
    Ok(Json(ArtistListResponse { artists }))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<AppState>,
    SearchBody(search): SearchBody,
) -> ApiResult<Json<ArtistSearchResponse>> {
    let artists = db::search_artists(&state.db, &search.search_term).await?;
    let shows = db::list_shows(&state.db).await?;
    let data = projections::artist_summaries(&artists, &shows, state.now())?;
    debug!("Artist search {:?} matched {} rows", search.search_term, data.len());

    Ok(Json(ArtistSearchResponse {
        results: projections::search_results(data),
        search_term: search.search_term,
    }))
}

/// GET /artists/:id
pub async fn show_artist(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> ApiResult<Json<ArtistDetail>> {
    let artist = find_artist(&state, id).await?;
    let shows = db::shows_for_artist(&state.db, id).await?;
    Ok(Json(projections::artist_detail(&artist, &shows, state.now())?))
}

pub async fn create_artist_form() -> Json<FormSchema> {
    Json(FormSchema::artist())
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<AppState>,
    FormJson(form): FormJson<ArtistForm>,
) -> Flash {
    let name = form.name.trim().to_string();
    let failure = format!("An error occurred. Artist {} could not be listed.", name);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return Flash::rejected(e, failure),
    };

    match db::create_artist(&state.db, &fields).await {
        Ok(id) => {
            debug!("Listed artist {} ({})", id, fields.name);
            Flash::created(id, format!("Artist {} was successfully listed!", fields.name))
        }
        Err(e) => Flash::failed(e, failure),
    }
}

pub async fn edit_artist_form(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> ApiResult<Json<ArtistEditResponse>> {
    let artist = find_artist(&state, id).await?;
    Ok(Json(ArtistEditResponse {
        form: ArtistForm::from(&artist),
        artist,
        schema: FormSchema::artist(),
    }))
}

/// POST /artists/:id/edit
pub async fn edit_artist(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
    FormJson(form): FormJson<ArtistForm>,
) -> Flash {
    let name = form.name.trim().to_string();
    let failure = format!("An error occurred. Artist {} could not be edited.", name);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return Flash::rejected(e, failure),
    };

    match db::update_artist(&state.db, id, &fields).await {
        Ok(()) => {
            debug!("Edited artist {}", id);
            Flash::done(id, format!("Artist {} was successfully edited!", fields.name))
        }
        Err(e) => Flash::failed(e, failure),
    }
}

pub async fn delete_artist(State(state): State<AppState>, EntityPath(id): EntityPath) -> Flash {
    match db::delete_artist(&state.db, id).await {
        Ok(removed_shows) => {
            debug!("Deleted artist {} and {} show(s)", id, removed_shows);
            Flash::done(id, format!("Artist with id {} was successfully deleted!", id))
        }
        Err(e) => Flash::failed(
            e,
            format!("An error occurred. Artist with id {} could not be deleted.", id),
        ),
    }
}

async fn find_artist(state: &AppState, id: EntityId) -> ApiResult<Artist> {
    db::get_artist(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artist {} not found", id)))
}

pub fn artist_routes() -> Router<AppState> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", get(create_artist_form).post(create_artist))
        .route("/artists/:id", get(show_artist))
        .route("/artists/:id/edit", get(edit_artist_form).post(edit_artist))
        .route("/artists/:id/delete", delete(delete_artist).post(delete_artist))
}
