use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::order_actor::OrderError;

/// Uniform response body. Business outcomes, successful or not, are HTTP 200
/// and tell the caller what happened through `success` and `message`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_assigned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_recorded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            already_assigned: None,
            audit_recorded: None,
            count: None,
            page: None,
            limit: None,
            total: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            ..ApiResponse::data(())
        }
        .with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{success: false, message}`. Only the message reaches the client.
#[derive(Debug)]
pub struct ApiFailure {
    message: String,
}

impl ApiFailure {
    /// `fallback` replaces the message of store failures, which are logged
    /// in full here instead.
    pub fn from_error(error: OrderError, fallback: &str) -> Self {
        match &error {
            OrderError::StoreFailure(detail) => error!(detail = %detail, "Store failure"),
            other => warn!(error = %other, "Request refused"),
        }
        Self { message: error.public_message(fallback) }
    }

    pub fn invalid_body(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Malformed request body");
        Self { message: rejection.body_text() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    message: &'a str,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        Json(FailureBody { success: false, message: self.message() }).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiFailure>;

/// Extension for turning lifecycle results into handler results.
pub trait OrFail<T> {
    fn or_fail(self, fallback: &str) -> Result<T, ApiFailure>;
}

impl<T> OrFail<T> for Result<T, OrderError> {
    fn or_fail(self, fallback: &str) -> Result<T, ApiFailure> {
        self.map_err(|e| ApiFailure::from_error(e, fallback))
    }
}
