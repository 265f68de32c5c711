//! Venue endpoints

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use fyyur_common::db;
use fyyur_common::forms::{FormSchema, VenueForm};
use fyyur_common::models::{EntityId, Venue};
use fyyur_common::projections::{self, SearchResults, VenueArea, VenueDetail};
use serde::Serialize;
use tracing::debug;

use super::{EntityPath, Flash, FormJson, SearchBody};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct VenueAreasResponse {
    pub areas: Vec<VenueArea>,
}

#[derive(Debug, Serialize)]
pub struct VenueSearchResponse {
    pub results: SearchResults,
    pub search_term: String,
}

/// Current record plus the prefilled form for editing it
#[derive(Debug, Serialize)]
pub struct VenueEditResponse {
    pub venue: Venue,
    pub form: VenueForm,
    pub schema: FormSchema,
}

/// GET /venues
pub async fn list_venues(State(state): State<AppState>) -> ApiResult<Json<VenueAreasResponse>> {
    let venues = db::list_venues(&state.db).await?;
    let shows = db::list_shows(&state.db).await?;
    let areas = projections::group_by_city_state(&venues, &shows, state.now())?;
    Ok(Json(VenueAreasResponse { areas }))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<AppState>,
    SearchBody(search): SearchBody,
) -> ApiResult<Json<VenueSearchResponse>> {
    let venues = db::search_venues(&state.db, &search.search_term).await?;
    let shows = db::list_shows(&state.db).await?;
    let data = projections::venue_summaries(&venues, &shows, state.now())?;
    debug!("Venue search {:?} matched {} rows", search.search_term, data.len());

    Ok(Json(VenueSearchResponse {
        results: projections::search_results(data),
        search_term: search.search_term,
    }))
}

/// GET /venues/:id
pub async fn show_venue(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> ApiResult<Json<VenueDetail>> {
    let venue = find_venue(&state, id).await?;
    let shows = db::shows_for_venue(&state.db, id).await?;
    Ok(Json(projections::venue_detail(&venue, &shows, state.now())?))
}

/// GET /venues/create
pub async fn create_venue_form() -> Json<FormSchema> {
    Json(FormSchema::venue())
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<AppState>,
    FormJson(form): FormJson<VenueForm>,
) -> Flash {
    let name = form.name.trim().to_string();
    let failure = format!("An error occurred. Venue {} could not be listed.", name);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return Flash::rejected(e, failure),
    };

    match db::create_venue(&state.db, &fields).await {
        Ok(id) => {
            debug!("Listed venue {} ({})", id, fields.name);
            Flash::created(id, format!("Venue {} was successfully listed!", fields.name))
        }
        Err(e) => Flash::failed(e, failure),
    }
}

/// GET /venues/:id/edit
pub async fn edit_venue_form(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
) -> ApiResult<Json<VenueEditResponse>> {
    let venue = find_venue(&state, id).await?;
    Ok(Json(VenueEditResponse {
        form: VenueForm::from(&venue),
        venue,
        schema: FormSchema::venue(),
    }))
}

/// POST /venues/:id/edit
pub async fn edit_venue(
    State(state): State<AppState>,
    EntityPath(id): EntityPath,
    FormJson(form): FormJson<VenueForm>,
) -> Flash {
    let name = form.name.trim().to_string();
    let failure = format!("An error occurred. Venue {} could not be edited.", name);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => return Flash::rejected(e, failure),
    };

    match db::update_venue(&state.db, id, &fields).await {
        Ok(()) => {
            debug!("Edited venue {}", id);
            Flash::done(id, format!("Venue {} was successfully edited!", fields.name))
        }
        Err(e) => Flash::failed(e, failure),
    }
}

/// DELETE or POST /venues/:id/delete
pub async fn delete_venue(State(state): State<AppState>, EntityPath(id): EntityPath) -> Flash {
    match db::delete_venue(&state.db, id).await {
        Ok(removed_shows) => {
            debug!("Deleted venue {} and {} show(s)", id, removed_shows);
            Flash::done(id, format!("Venue with id {} was successfully deleted!", id))
        }
        Err(e) => Flash::failed(
            e,
            format!("An error occurred. Venue with id {} could not be deleted.", id),
        ),
    }
}

async fn find_venue(state: &AppState, id: EntityId) -> ApiResult<Venue> {
    db::get_venue(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Venue {} not found", id)))
}

pub fn venue_routes() -> Router<AppState> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", get(create_venue_form).post(create_venue))
        .route("/venues/:id", get(show_venue))
        .route("/venues/:id/edit", get(edit_venue_form).post(edit_venue))
        .route("/venues/:id/delete", delete(delete_venue).post(delete_venue))
}
