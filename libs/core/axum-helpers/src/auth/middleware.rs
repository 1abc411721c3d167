use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::Value;

use super::AuthOptions;
use crate::errors::{AppError, messages};

/// Decoded claims of the bearer token that authenticated the request
///
/// Inserted by [`require_auth`]; extract it in handlers behind that layer.
///
/// ```ignore
/// async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<Value> {
///     Json(claims)
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser(pub Value);

impl AuthenticatedUser {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The `sub` claim, if it is a string
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(messages::NO_TOKEN))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = match headers.get(AUTHORIZATION) {
        None => return Err(AppError::unauthorized(messages::NO_TOKEN)),
        Some(value) if value.is_empty() => return Err(AppError::unauthorized(messages::NO_TOKEN)),
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::unauthorized(messages::MALFORMED_AUTH_HEADER))?,
    };

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized(messages::MALFORMED_AUTH_HEADER))?;

    if token.is_empty() {
        return Err(AppError::unauthorized(messages::NO_TOKEN));
    }
    Ok(token)
}

fn verify(options: &AuthOptions, token: &str) -> Result<Value, AppError> {
    jsonwebtoken::decode::<Value>(token, &options.decoding_key(), &options.validation())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("JWT verification failed: {}", e);
            AppError::unauthorized(failure_message(e.kind()))
        })
}

/// Client message for a failed verification. Key and provider failures are
/// ours, not the caller's, so they do not blame the token.
fn failure_message(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ExpiredSignature => messages::TOKEN_EXPIRED,
        ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidEcdsaKey
        | ErrorKind::InvalidEddsaKey
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Provider(_) => messages::AUTH_FAILED,
        _ => messages::INVALID_TOKEN,
    }
}

/// JWT authentication middleware
///
/// Verifies the bearer token with the configured secret and algorithms and
/// inserts its claims as [`AuthenticatedUser`]. Every failure is a 401
/// [`AppError`]:
///
/// | Condition | Message |
/// |---|---|
/// | no header, empty header, `Bearer ` with no token | `Access denied. No token provided.` |
/// | scheme other than `Bearer` | `Malformed authorization header.` |
/// | `exp` in the past | `Token expired.` |
/// | bad signature, algorithm or encoding | `Invalid token.` |
/// | unusable key | `Authentication failed.` |
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::get};
/// use axum_helpers::auth::{AuthOptions, require_auth};
///
/// let protected = Router::new()
///     .route("/api/me", get(me))
///     .layer(middleware::from_fn_with_state(AuthOptions::from_env()?, require_auth));
/// ```
pub async fn require_auth(
    State(options): State<AuthOptions>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        verify(&options, token)?
    };

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, body::Body, http::StatusCode, middleware, routing::get};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::json;
    use test_utils::TestDataBuilder;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-that-is-long-enough-32";

    async fn me(user: AuthenticatedUser) -> Json<Value> {
        Json(json!({ "sub": user.subject() }))
    }

    fn app(options: AuthOptions) -> Router {
        Router::new()
            .route("/me", get(me))
            .layer(middleware::from_fn_with_state(options, require_auth))
    }

    fn token_with(claims: Value, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn token(claims: Value) -> String {
        token_with(claims, Algorithm::HS256, SECRET)
    }

    async fn call(options: AuthOptions, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut request = axum::http::Request::get("/me");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app(options)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let subject = TestDataBuilder::from_test_name("test_valid_token_reaches_handler").subject();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let bearer = format!("Bearer {}", token(json!({ "sub": subject, "exp": exp })));

        let (status, body) = call(AuthOptions::new(SECRET), Some(&bearer)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sub"], subject.as_str());
    }

    #[tokio::test]
    async fn test_token_without_exp_is_accepted() {
        let bearer = format!("Bearer {}", token(json!({ "sub": "svc" })));
        let (status, _) = call(AuthOptions::new(SECRET), Some(&bearer)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (status, body) = call(AuthOptions::new(SECRET), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access denied. No token provided.");
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_empty_header() {
        let (_, body) = call(AuthOptions::new(SECRET), Some("")).await;
        assert_eq!(body["message"], "Access denied. No token provided.");
    }

    #[tokio::test]
    async fn test_bearer_without_token() {
        let (status, body) = call(AuthOptions::new(SECRET), Some("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access denied. No token provided.");
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let (status, body) = call(AuthOptions::new(SECRET), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Malformed authorization header.");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let bearer = format!("Bearer {}", token(json!({ "sub": "u1", "exp": exp })));

        let (status, body) = call(AuthOptions::new(SECRET), Some(&bearer)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired.");
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let other = token_with(json!({ "sub": "u1" }), Algorithm::HS256, "some-other-secret");
        let (_, body) = call(AuthOptions::new(SECRET), Some(&format!("Bearer {other}"))).await;
        assert_eq!(body["message"], "Invalid token.");
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let (status, body) = call(AuthOptions::new(SECRET), Some("Bearer not.a.jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token.");
    }

    #[tokio::test]
    async fn test_algorithm_outside_allow_list() {
        let hs512 = token_with(json!({ "sub": "u1" }), Algorithm::HS512, SECRET);

        let (_, rejected) = call(AuthOptions::new(SECRET), Some(&format!("Bearer {hs512}"))).await;
        assert_eq!(rejected["message"], "Invalid token.");

        let options = AuthOptions::new(SECRET).with_algorithms([Algorithm::HS512]);
        let (status, _) = call(options, Some(&format!("Bearer {hs512}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = Router::new().route("/me", get(me));
        let response = app
            .oneshot(axum::http::Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_key_failures_report_authentication_failed() {
        for kind in [
            ErrorKind::InvalidKeyFormat,
            ErrorKind::InvalidEcdsaKey,
            ErrorKind::InvalidEddsaKey,
            ErrorKind::InvalidRsaKey("bad modulus".to_string()),
            ErrorKind::MissingAlgorithm,
            ErrorKind::Provider("backend unavailable".to_string()),
        ] {
            assert_eq!(failure_message(&kind), "Authentication failed.", "{kind:?}");
        }
    }

    #[test]
    fn test_token_failures_report_invalid_token() {
        for kind in [
            ErrorKind::InvalidToken,
            ErrorKind::InvalidSignature,
            ErrorKind::InvalidAlgorithm,
        ] {
            assert_eq!(failure_message(&kind), "Invalid token.", "{kind:?}");
        }
        assert_eq!(failure_message(&ErrorKind::ExpiredSignature), "Token expired.");
    }
}
