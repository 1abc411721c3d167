//! Standard messages for consistent error responses.

pub const SUCCESS: &str = "Success";
pub const GENERIC_ERROR: &str = "Something went wrong!";
pub const VALIDATION_FAILED: &str = "Validation failed for the provided input.";
pub const INVALID_JSON: &str = "Invalid JSON format.";
pub const NOT_FOUND_RESOURCE: &str = "Requested resource was not found.";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred.";

// Authentication
pub const NO_TOKEN: &str = "Access denied. No token provided.";
pub const MALFORMED_AUTH_HEADER: &str = "Malformed authorization header.";
pub const TOKEN_EXPIRED: &str = "Token expired.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const AUTH_FAILED: &str = "Authentication failed.";
