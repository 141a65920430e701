use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

/// Outcome of a request as reported to the client.
#[derive(Debug, Serialize)]
pub struct State {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `{state, data}` wrapper every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            state: State {
                status: Status::Success,
                error: None,
            },
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: State {
                status: Status::Error,
                error: Some(message.into()),
            },
            data: None,
        }
    }
}

/// Successful response: status code plus optional `data` payload.
#[derive(Debug)]
pub struct ApiResponse {
    code: StatusCode,
    data: Option<Value>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            code: StatusCode::OK,
            data: Some(data),
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            code: StatusCode::OK,
            data: None,
        }
    }

    pub fn created(data: Value) -> Self {
        Self {
            code: StatusCode::CREATED,
            data: Some(data),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.code, Json(Envelope::success(self.data))).into_response()
    }
}
