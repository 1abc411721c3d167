//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Validates the request body using the `validator` crate's `Validate` trait.
/// Malformed JSON and failed validation both reject with an operational
/// [`AppError`]; validation failures list one `"field: message"` entry per
/// broken rule in `errors`.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateUser {
///     #[validate(length(min = 3, max = 50))]
///     username: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUser>) -> String {
///     format!("Creating user: {}", payload.username)
/// }
///
/// let app = Router::new().route("/users", post(create_user));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct CreateUser {
        #[validate(length(min = 3, message = "must be at least 3 characters"))]
        username: String,
    }

    async fn create(ValidatedJson(user): ValidatedJson<CreateUser>) -> String {
        user.username
    }

    async fn post_json(body: &'static str) -> (StatusCode, axum::body::Bytes) {
        let app = Router::new().route("/users", post(create));
        let response = app
            .oneshot(
                axum::http::Request::post("/users")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, response.into_body().collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn test_valid_body() {
        let (status, body) = post_json(r#"{"username":"ada"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"ada");
    }

    #[tokio::test]
    async fn test_invalid_field_lists_errors() {
        let (status, body) = post_json(r#"{"username":"al"}"#).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "fail");
        assert_eq!(json["errors"][0], "username: must be at least 3 characters");
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (status, body) = post_json(r#"{"username":"#).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert!(status.is_client_error());
        assert_eq!(json["message"], "Invalid JSON format.");
    }
}
