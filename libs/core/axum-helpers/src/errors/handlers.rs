use super::{AppError, messages};

/// Handler for unmatched routes.
///
/// This can be used as a fallback handler in your router; the 404 goes
/// through the error handler like every other error.
pub async fn not_found() -> AppError {
    AppError::not_found(messages::NOT_FOUND_RESOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_not_found_is_operational_fail() {
        let error = not_found().await;
        assert_eq!(error.status(), "fail");
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
