//! Extractors that keep rejections in the JSON response shapes

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Form, Json,
};
use fyyur_common::forms;
use fyyur_common::models::EntityId;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::flash::{Flash, UNREADABLE_FORM};
use super::SearchForm;
use crate::ApiError;

/// JSON form body
///
/// An unreadable body becomes a failed [`Flash`]; a field of the wrong type
/// is reported against that field.
#[derive(Debug)]
pub struct FormJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Flash;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| Flash::unreadable(rejection.status(), rejection.body_text()))?;

        forms::decode_payload(payload)
            .map(FormJson)
            .map_err(|e| Flash::rejected(e, UNREADABLE_FORM.to_string()))
    }
}

/// Entity id from the `:id` path segment
#[derive(Debug, Clone, Copy)]
pub struct EntityPath(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for EntityPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<EntityId>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Url-encoded search body
#[derive(Debug)]
pub struct SearchBody(pub SearchForm);

#[async_trait]
impl<S> FromRequest<S> for SearchBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Form::<SearchForm>::from_request(req, state)
            .await
            .map(|Form(search)| Self(search))
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))
    }
}
