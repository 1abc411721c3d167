pub mod catch;
pub mod handlers;
pub mod messages;
pub mod middleware;

pub use catch::catch_async;
pub use handlers::not_found;
pub use middleware::{ErrorHandlerConfig, error_handler};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing_error::SpanTrace;
use validator::ValidationErrors;

/// Error body sent to clients in production.
///
/// # JSON Example
///
/// ```json
/// {
///   "status": "fail",
///   "message": "Validation failed for the provided input.",
///   "errors": ["email: must be a valid email"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// `"fail"` for client errors, `"error"` for server errors
    pub status: String,
    pub message: String,
    /// Only present when the error carries detail messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Error body sent to clients in development: everything we know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentErrorResponse {
    pub status: String,
    pub message: String,
    pub error: ErrorDetail,
    pub errors: Vec<String>,
    /// Active tracing spans when the error was created
    pub stack: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub status_code: u16,
    pub is_operational: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Application error that renders as an HTTP response.
///
/// Errors built explicitly (`AppError::new`, `AppError::not_found`, ...) are
/// *operational*: expected failures whose message is safe to show a client.
/// Errors converted from library failures (`io`, `serde_json`, `eyre`,
/// database) are not; in production their message is replaced by a generic
/// one.
///
/// # Example
///
/// ```ignore
/// use axum_helpers::AppError;
///
/// async fn get_order() -> Result<Json<Order>, AppError> {
///     Err(AppError::not_found("Order not found").with_errors(["id: unknown"]))
/// }
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    message: String,
    status_code: StatusCode,
    errors: Vec<String>,
    operational: bool,
    detail: Option<String>,
    span_trace: SpanTrace,
}

impl AppError {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code,
            errors: Vec::new(),
            operational: true,
            detail: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Wrap an unexpected failure: status 500, not operational
    pub fn unexpected<E: fmt::Display + fmt::Debug>(error: E) -> Self {
        Self {
            message: error.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            errors: Vec::new(),
            operational: false,
            detail: Some(format!("{error:?}")),
            span_trace: SpanTrace::capture(),
        }
    }

    /// Attach detail messages (e.g. one per invalid field)
    pub fn with_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors = errors.into_iter().map(Into::into).collect();
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::CONFLICT)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// `"fail"` for 4xx, `"error"` for everything else
    pub fn status(&self) -> &'static str {
        if self.status_code.is_client_error() {
            "fail"
        } else {
            "error"
        }
    }

    /// Detail messages; `None` when there are none
    pub fn errors(&self) -> Option<&[String]> {
        (!self.errors.is_empty()).then_some(self.errors.as_slice())
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Debug rendering of the wrapped error, if any
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Status code sent in production: non-operational errors are always 500
    pub fn response_status(&self) -> StatusCode {
        if self.operational {
            self.status_code
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn production_body(&self) -> ErrorResponse {
        if self.operational {
            ErrorResponse {
                status: self.status().to_string(),
                message: self.message.clone(),
                errors: self.errors().map(<[String]>::to_vec),
            }
        } else {
            ErrorResponse {
                status: "error".to_string(),
                message: messages::GENERIC_ERROR.to_string(),
                errors: None,
            }
        }
    }

    pub fn development_body(&self) -> DevelopmentErrorResponse {
        DevelopmentErrorResponse {
            status: self.status().to_string(),
            message: self.message.clone(),
            error: ErrorDetail {
                status_code: self.status_code.as_u16(),
                is_operational: self.operational,
                detail: self.detail.clone(),
            },
            errors: self.errors.clone(),
            stack: self.span_trace.to_string(),
        }
    }
}

/// The error behind a rendered error response.
///
/// [`AppError::into_response`] stores it in the response extensions so the
/// [`error_handler`] middleware can log it and re-render the body for the
/// current environment.
#[derive(Debug, Clone)]
pub struct ErrorReport(pub AppError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = (self.response_status(), Json(self.production_body())).into_response();
        response.extensions_mut().insert(ErrorReport(self));
        response
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::unexpected(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::unexpected(error)
    }
}

impl From<eyre::Report> for AppError {
    fn from(error: eyre::Report) -> Self {
        Self::unexpected(error)
    }
}

impl From<database::DatabaseError> for AppError {
    fn from(error: database::DatabaseError) -> Self {
        Self::unexpected(error)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(messages::INVALID_JSON, rejection.status()).with_errors([rejection.body_text()])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(messages::VALIDATION_FAILED).with_errors(validation_messages(&errors))
    }
}

/// One `"field: message"` line per failed rule, sorted for stable output
fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", error.code),
            })
        })
        .collect();
    lines.sort();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_is_fail_for_client_errors() {
        assert_eq!(AppError::bad_request("x").status(), "fail");
        assert_eq!(AppError::new("x", StatusCode::IM_A_TEAPOT).status(), "fail");
        assert_eq!(AppError::internal("x").status(), "error");
        assert_eq!(AppError::new("x", StatusCode::BAD_GATEWAY).status(), "error");
    }

    #[test]
    fn test_errors_absent_when_empty() {
        let error = AppError::not_found("User not found");
        assert!(error.errors().is_none());
        assert!(error.is_operational());

        let error = error.with_errors(["id: unknown"]);
        assert_eq!(error.errors(), Some(&["id: unknown".to_string()][..]));
    }

    #[test]
    fn test_wrapped_errors_are_not_operational() {
        let io = std::io::Error::other("disk on fire");
        let error = AppError::from(io);

        assert!(!error.is_operational());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "disk on fire");
        assert!(error.detail().unwrap().contains("disk on fire"));
    }

    #[test]
    fn test_database_error_is_not_operational() {
        let error = AppError::from(database::DatabaseError::ShuttingDown);
        assert!(!error.is_operational());
        assert_eq!(error.production_body().message, messages::GENERIC_ERROR);
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "must be a valid email"))]
        email: String,
        #[validate(length(min = 8))]
        password: String,
    }

    #[test]
    fn test_validation_errors_list_each_field() {
        let signup = Signup {
            email: "nope".into(),
            password: "short".into(),
        };
        let error = AppError::from(signup.validate().unwrap_err());

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), messages::VALIDATION_FAILED);
        assert_eq!(
            error.errors().unwrap(),
            ["email: must be a valid email", "password: length"]
        );
    }

    #[tokio::test]
    async fn test_operational_response_body() {
        let response = AppError::conflict("Email already registered")
            .with_errors(["email: taken"])
            .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.extensions().get::<ErrorReport>().is_some());

        let body = json_body(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Email already registered");
        assert_eq!(body["errors"][0], "email: taken");
    }

    #[tokio::test]
    async fn test_operational_response_omits_empty_errors() {
        let body = json_body(AppError::forbidden("Nope").into_response()).await;
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_unexpected_response_hides_message() {
        let response = AppError::unexpected("connection pool exploded").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Something went wrong!");
    }

    #[test]
    fn test_development_body_exposes_everything() {
        let body = AppError::unexpected("boom").development_body();
        assert_eq!(body.message, "boom");
        assert_eq!(body.error.status_code, 500);
        assert!(!body.error.is_operational);
        assert!(body.errors.is_empty());
    }
}
