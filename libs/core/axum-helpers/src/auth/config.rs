//! Token verification settings for [`require_auth`](super::require_auth).

use core_config::{ConfigError, FromEnv, env_required};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

const MIN_SECRET_LEN: usize = 32;

/// JWT verification options.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters
/// - `JWT_ALGORITHMS` (optional) - Comma-separated list, e.g. `HS256,HS512`
///
/// # Example
///
/// ```ignore
/// use axum_helpers::auth::AuthOptions;
/// use core_config::FromEnv;
/// use jsonwebtoken::Algorithm;
///
/// // From environment variables
/// let options = AuthOptions::from_env()?;
///
/// // Manual construction
/// let options = AuthOptions::new("secret").with_algorithms([Algorithm::HS512]);
/// ```
#[derive(Clone, Debug)]
pub struct AuthOptions {
    /// HMAC secret tokens are signed with
    pub secret: String,
    /// Accepted algorithms; `None` means HS256 only
    pub algorithms: Option<Vec<Algorithm>>,
}

impl AuthOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithms: None,
        }
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = Some(algorithms.into_iter().collect());
        self
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }

    /// Signature and `exp`/`nbf` (when present) are checked; no claim is
    /// required and the audience is not checked.
    pub(crate) fn validation(&self) -> Validation {
        let algorithms = match &self.algorithms {
            Some(algorithms) if !algorithms.is_empty() => algorithms.clone(),
            _ => vec![Algorithm::HS256],
        };

        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation
    }
}

impl FromEnv for AuthOptions {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let mut options = Self::new(secret);

        if let Ok(raw) = std::env::var("JWT_ALGORITHMS") {
            let algorithms = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    name.parse::<Algorithm>()
                        .map_err(|e| ConfigError::ParseError {
                            key: "JWT_ALGORITHMS".to_string(),
                            details: format!("{name}: {e}"),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            options = options.with_algorithms(algorithms);
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_default_validation_is_hs256_without_required_claims() {
        let validation = AuthOptions::new("s").validation();
        assert_eq!(validation.algorithms, vec![Algorithm::HS256]);
        assert!(validation.required_spec_claims.is_empty());
        assert!(!validation.validate_aud);
        assert!(validation.validate_exp);
    }

    #[test]
    fn test_empty_algorithm_list_falls_back_to_default() {
        let validation = AuthOptions::new("s").with_algorithms(Vec::new()).validation();
        assert_eq!(validation.algorithms, vec![Algorithm::HS256]);
    }

    #[test]
    fn test_auth_options_from_env_valid() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_ALGORITHMS", Some("HS256, HS512"))],
            || {
                let options = AuthOptions::from_env().unwrap();
                assert_eq!(options.secret, SECRET);
                assert_eq!(
                    options.algorithms,
                    Some(vec![Algorithm::HS256, Algorithm::HS512])
                );
            },
        );
    }

    #[test]
    fn test_auth_options_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = AuthOptions::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_auth_options_from_env_too_short() {
        temp_env::with_vars(
            [("JWT_SECRET", Some("short")), ("JWT_ALGORITHMS", None)],
            || {
                let err = AuthOptions::from_env().unwrap_err();
                assert!(err.to_string().contains("32 characters"));
            },
        );
    }

    #[test]
    fn test_auth_options_from_env_bad_algorithm() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_ALGORITHMS", Some("HS256,ROT13"))],
            || {
                let err = AuthOptions::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_ALGORITHMS"));
            },
        );
    }
}
