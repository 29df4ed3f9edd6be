//! Uniform success envelope for HTTP responses.
//!
//! ```text
//! {"success":true,"data":{...}}
//! {"success":true,"data":null,"message":"Business deleted"}
//! ```
//!
//! Failures use the same `success` flag and are rendered by the
//! [`ResponseError`](actix_web::ResponseError) impl in `error.rs`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap `data` in a success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render with the given status.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// `200 OK` with `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    Envelope::ok(data).respond(StatusCode::OK)
}

/// `201 Created` with `data`.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    Envelope::ok(data).respond(StatusCode::CREATED)
}

/// `200 OK` with `data: null` and a message.
pub fn acknowledged(message: impl Into<String>) -> HttpResponse {
    Envelope::ok(()).with_message(message).respond(StatusCode::OK)
}
