pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use crate::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenManager};

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// The user's first name. Must not be empty.
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    /// The user's last name. Must not be empty.
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// User's password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Partial profile update: only supplied fields change. Email and password are
/// immutable through this surface.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: Option<String>,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
    /// The authenticated user, excluding the password hash.
    pub user: User,
}
