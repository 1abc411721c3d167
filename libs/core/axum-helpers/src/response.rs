//! Uniform JSON envelopes for handler responses.
//!
//! ```json
//! { "status": "success", "success": true, "message": "Success", "data": { "id": 1 } }
//! { "status": "error", "success": false, "message": "Bad input", "data": { "field": "name" } }
//! ```

use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::messages;

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody<T> {
    /// `"success"` or `"error"`
    pub status: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A JSON envelope plus status code and headers, rendered on return.
///
/// Headers and cookies can be chained before the handler returns it.
///
/// # Example
///
/// ```ignore
/// use axum_helpers::response::send_success;
/// use axum::http::{HeaderValue, StatusCode};
///
/// async fn create_order() -> impl IntoResponse {
///     send_success(order)
///         .message("Order created")
///         .status(StatusCode::CREATED)
///         .cookie(HeaderValue::from_static("last_order=42; Path=/; HttpOnly"))
/// }
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct ApiResponse<T> {
    status_code: StatusCode,
    headers: HeaderMap,
    body: ResponseBody<T>,
}

/// 200 `{status: "success", success: true, message: "Success", data}`
pub fn send_success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        status_code: StatusCode::OK,
        headers: HeaderMap::new(),
        body: ResponseBody {
            status: "success".to_string(),
            success: true,
            message: messages::SUCCESS.to_string(),
            data: Some(data),
        },
    }
}

/// 400 `{status: "error", success: false, message}`; attach data with
/// [`ApiResponse::data`]
pub fn send_error(message: impl Into<String>) -> ApiResponse<()> {
    ApiResponse {
        status_code: StatusCode::BAD_REQUEST,
        headers: HeaderMap::new(),
        body: ResponseBody {
            status: "error".to_string(),
            success: false,
            message: message.into(),
            data: None,
        },
    }
}

impl<T> ApiResponse<T> {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.message = message.into();
        self
    }

    pub fn status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Set a response header, replacing any previous value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a `Set-Cookie` header
    pub fn cookie(mut self, cookie: HeaderValue) -> Self {
        self.headers.append(SET_COOKIE, cookie);
        self
    }

    /// Replace the payload
    pub fn data<U>(self, data: U) -> ApiResponse<U> {
        ApiResponse {
            status_code: self.status_code,
            headers: self.headers,
            body: ResponseBody {
                status: self.body.status,
                success: self.body.success,
                message: self.body.message,
                data: Some(data),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn body(&self) -> &ResponseBody<T> {
        &self.body
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, self.headers, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CACHE_CONTROL;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn render(response: impl IntoResponse) -> (StatusCode, HeaderMap, Value) {
        let response = response.into_response();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_send_success_defaults() {
        let (status, _, body) = render(send_success(json!({ "id": 1 }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "success",
                "success": true,
                "message": "Success",
                "data": { "id": 1 }
            })
        );
    }

    #[tokio::test]
    async fn test_send_success_custom_message_and_status() {
        let response = send_success(json!({ "id": 1 }))
            .message("Created")
            .status(StatusCode::CREATED);
        let (status, _, body) = render(response).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Created");
    }

    #[tokio::test]
    async fn test_send_error_without_data() {
        let (status, _, body) = render(send_error("Bad input")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "status": "error", "success": false, "message": "Bad input" })
        );
    }

    #[tokio::test]
    async fn test_send_error_with_data_and_status() {
        let response = send_error("Conflict")
            .status(StatusCode::CONFLICT)
            .data(json!({ "details": "extra" }));
        let (status, _, body) = render(response).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["details"], "extra");
    }

    #[tokio::test]
    async fn test_headers_and_cookies_chain() {
        let response = send_success("ok")
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .cookie(HeaderValue::from_static("a=1; Path=/"))
            .cookie(HeaderValue::from_static("b=2; Path=/"));
        let (_, headers, _) = render(response).await;

        assert_eq!(headers[CACHE_CONTROL], "no-store");
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 2);
    }
}
