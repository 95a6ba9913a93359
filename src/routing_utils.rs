use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::Serialize;
use std::num::ParseIntError;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain;

/// Body of every failed API call
#[derive(Serialize, Debug, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct BasicErrorResponse {
    #[schema(example = "Title should not be blank")]
    pub error: String,
}

fn basic_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(BasicErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Response type that turns domain errors into [BasicErrorResponse]s
pub struct DomainErrorResponse(pub domain::Error);

impl IntoResponse for DomainErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            domain::Error::Invalid(ref validation_errs) => {
                let message = domain::item::first_failure_message(validation_errs);
                info!("Rejected invalid input: {message}");
                basic_error(StatusCode::BAD_REQUEST, message)
            }
            domain::Error::NotFound { message } => basic_error(StatusCode::NOT_FOUND, message),
            domain::Error::RetrieveFailure { .. } => {
                basic_error(StatusCode::BAD_REQUEST, self.0.to_string())
            }
            domain::Error::PersistFailure { .. } => {
                error!("Responding with persistence failure: {:#}", self.0);
                basic_error(StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
        }
    }
}

impl From<domain::Error> for DomainErrorResponse {
    fn from(value: domain::Error) -> Self {
        Self(value)
    }
}

/// Response type for a path ID which isn't an integer
#[derive(Debug)]
pub struct InvalidIdResponse {
    raw_id: String,
    problem: ParseIntError,
}

impl IntoResponse for InvalidIdResponse {
    fn into_response(self) -> Response {
        info!("Rejected malformed id {:?}", self.raw_id);
        basic_error(
            StatusCode::BAD_REQUEST,
            format!("invalid id {:?}: {}", self.raw_id, self.problem),
        )
    }
}

/// Reads an entity ID out of a URL path segment. Any 64-bit integer is accepted, so callers
/// decide what an ID outside their storage range means.
pub fn parse_id(raw_id: &str) -> Result<i64, InvalidIdResponse> {
    raw_id.parse().map_err(|problem| InvalidIdResponse {
        raw_id: raw_id.to_owned(),
        problem,
    })
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    pub(crate) parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        info!("Rejected unreadable request body: {}", self.parse_problem);
        basic_error(StatusCode::BAD_REQUEST, self.parse_problem)
    }
}

/// Wrapper for [axum::extract::Query] which reports unreadable query strings with our
/// data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(QueryErrorResponse))]
pub struct Query<T>(pub T);

/// Response type representing query string parse errors
pub struct QueryErrorResponse {
    parse_problem: String,
}

impl From<QueryRejection> for QueryErrorResponse {
    fn from(value: QueryRejection) -> Self {
        QueryErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for QueryErrorResponse {
    fn into_response(self) -> Response {
        info!("Rejected unreadable query string: {}", self.parse_problem);
        basic_error(StatusCode::BAD_REQUEST, self.parse_problem)
    }
}
