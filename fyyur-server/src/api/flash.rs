//! Outcome messages for create/edit/delete submissions
//!
//! Store failures never reach the caller raw: they are logged and replaced
//! by the generic message the handler supplies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fyyur_common::forms::{ValidationErrors, BODY_FIELD};
use fyyur_common::models::EntityId;
use fyyur_common::Error;
use serde::Serialize;
use tracing::{error, warn};

pub(crate) const UNREADABLE_FORM: &str = "The submitted form could not be read.";

#[derive(Debug, Serialize)]
pub struct FlashBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,
}

#[derive(Debug)]
pub struct Flash {
    status: StatusCode,
    body: FlashBody,
}

impl Flash {
    pub fn created(id: EntityId, message: String) -> Self {
        Self::ok(StatusCode::CREATED, Some(id), message)
    }

    pub fn done(id: EntityId, message: String) -> Self {
        Self::ok(StatusCode::OK, Some(id), message)
    }

    /// Validation failed before anything reached the store
    pub fn rejected(err: Error, fallback: String) -> Self {
        match err {
            Error::Validation(errors) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: FlashBody {
                    success: false,
                    message: errors.to_string(),
                    id: None,
                    errors,
                },
            },
            other => Self::failed(other, fallback),
        }
    }

    /// The body could not be parsed as JSON at all
    pub fn unreadable(status: StatusCode, reason: String) -> Self {
        warn!("Unreadable form body: {}", reason);
        let mut errors = ValidationErrors::default();
        errors.add(BODY_FIELD, reason);
        Self {
            status,
            body: FlashBody {
                success: false,
                message: UNREADABLE_FORM.to_string(),
                id: None,
                errors,
            },
        }
    }

    /// The store refused or failed the write; `message` is shown instead
    pub fn failed(err: Error, message: String) -> Self {
        let status = match &err {
            Error::NotFound(_) => {
                warn!("{}: {}", message, err);
                StatusCode::NOT_FOUND
            }
            Error::ReferentialIntegrity(_) => {
                warn!("{}: {}", message, err);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => {
                error!("{}: {}", message, err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            body: FlashBody {
                success: false,
                message,
                id: None,
                errors: ValidationErrors::default(),
            },
        }
    }

    fn ok(status: StatusCode, id: Option<EntityId>, message: String) -> Self {
        Self {
            status,
            body: FlashBody {
                success: true,
                message,
                id,
                errors: ValidationErrors::default(),
            },
        }
    }
}

impl IntoResponse for Flash {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
