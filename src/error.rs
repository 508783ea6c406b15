use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::Debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    NotFound,
    NoBids,
    DuplicateBid,
    JobClosed,
    InvalidInput,
    Storage,
    Upstream,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    pub kind: Kind,
    pub message: String,
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.kind {
            Kind::NotFound => (StatusCode::NOT_FOUND, self.message.as_str()),
            Kind::NoBids | Kind::DuplicateBid | Kind::JobClosed => {
                (StatusCode::CONFLICT, self.message.as_str())
            }
            Kind::InvalidInput => (StatusCode::BAD_REQUEST, self.message.as_str()),
            Kind::Storage | Kind::Upstream | Kind::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn not_found_error() -> Error {
    Error {
        kind: Kind::NotFound,
        message: "job not found".into(),
    }
}

pub fn no_bids_error() -> Error {
    Error {
        kind: Kind::NoBids,
        message: "job has no bids".into(),
    }
}

pub fn duplicate_bid_error() -> Error {
    Error {
        kind: Kind::DuplicateBid,
        message: "business has already bid on this job".into(),
    }
}

pub fn job_closed_error() -> Error {
    Error {
        kind: Kind::JobClosed,
        message: "job is closed to bidding".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        kind: Kind::InvalidInput,
        message: "invalid input".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        kind: Kind::Internal,
        message: "environment variable error".into(),
    }
}

pub fn database_error<T: Debug>(_: T) -> Error {
    Error {
        kind: Kind::Storage,
        message: "database error".into(),
    }
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error {
        kind: Kind::Upstream,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        kind: Kind::Upstream,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        kind: Kind::Internal,
        message: "unexpected error".into(),
    }
}
