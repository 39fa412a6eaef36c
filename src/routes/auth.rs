use crate::{
    auth::{
        hash_password, verify_password, AuthResponse, AuthenticatedUser, LoginRequest,
        ProfileUpdate, RegisterRequest, TokenManager,
    },
    error::AppError,
    models::{User, UserRecord},
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account, hashes the password, and returns the new user
/// together with a freshly issued authentication token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input; every violated field rule is reported.
    register_data.validate()?;

    // Check if email already exists
    let existing_user = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    // Insert new user; the RETURNING list excludes the hash. A concurrent
    // registration of the same email can slip past the pre-check above and
    // hit the unique constraint instead, so that case is still a conflict.
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, email, first_name, last_name, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&register_data.email)
    .bind(&password_hash)
    .bind(&register_data.first_name)
    .bind(&register_data.last_name)
    .fetch_one(&**pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "User already exists"))?;

    let token = tokens.issue(user.id, &user.email)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".into(),
        token,
        user,
    }))
}

/// Login user
///
/// Authenticates a user and returns a fresh token. Unknown email and wrong
/// password produce the identical response so callers cannot probe which
/// emails are registered.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT id, email, password_hash, first_name, last_name, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let record = match user {
        Some(record) => record,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&login_data.password, &record.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = tokens.issue(record.id, &record.email)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: record.into(),
    }))
}

/// Logout
///
/// Tokens are stateless and there is no revocation list; logout simply
/// acknowledges so clients can discard their token.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Logout successful"
    }))
}

/// Get the authenticated user's profile.
///
/// Returns 404 when the id from the token no longer resolves, e.g. the user
/// row was removed out-of-band after the token was issued.
#[get("/profile")]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = sqlx::query_as::<_, User>(
        "SELECT id, email, first_name, last_name, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match profile {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Update the authenticated user's profile.
///
/// Partial update of the display name: absent fields are left untouched,
/// never nulled. Email and password cannot be changed through this surface.
#[put("/profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    update: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users
         SET first_name = COALESCE($1, first_name),
             last_name = COALESCE($2, last_name),
             updated_at = NOW()
         WHERE id = $3
         RETURNING id, email, first_name, last_name, created_at, updated_at",
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(updated) => Ok(HttpResponse::Ok().json(json!({
            "message": "Profile updated successfully",
            "user": updated,
        }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}
