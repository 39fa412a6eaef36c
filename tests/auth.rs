use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use dotenv::dotenv;
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;
use taskpad::auth::{AuthMiddleware, Claims, TokenManager};
use taskpad::routes;
use uuid::Uuid;

const TEST_SECRET: &str = "integration_test_secret";

/// Connects to the test database, or `None` when `DATABASE_URL` is not set
/// (in which case the calling test skips itself).
async fn test_pool() -> Option<PgPool> {
    dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    match PgPool::connect(&url).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("Skipping: failed to connect to test DB: {}", e);
            None
        }
    }
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(TokenManager::new(TEST_SECRET, 24)))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, Uuid::new_v4().simple())
}

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);
    let email = unique_email("flow");

    // Register a new user
    let register_payload = json!({
        "email": email,
        "password": "secret1",
        "first_name": "Jo",
        "last_name": "Do"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let register_token = body["token"].as_str().unwrap().to_string();
    assert!(!register_token.is_empty());
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["first_name"], "Jo");
    assert!(
        body["user"].get("password_hash").is_none(),
        "The password hash must never be serialized"
    );

    // Registering the same email again is a conflict
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User already exists");

    // Login with the registered credentials
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let login_token = body["token"].as_str().unwrap().to_string();
    assert!(!login_token.is_empty());
    assert_eq!(body["user"]["email"], email);
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);
    let email = unique_email("enum");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": email,
            "password": "secret1",
            "first_name": "Jo",
            "last_name": "Do"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    // Wrong password for a known email
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let wrong_password_status = resp.status();
    let wrong_password_body = test::read_body(resp).await;

    // Unknown email entirely
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": unique_email("nobody"),
            "password": "wrong-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let unknown_email_status = resp.status();
    let unknown_email_body = test::read_body(resp).await;

    // Identical status and body, so callers cannot probe registered emails.
    assert_eq!(wrong_password_status, 401);
    assert_eq!(wrong_password_status, unknown_email_status);
    assert_eq!(wrong_password_body, unknown_email_body);
    let body: serde_json::Value = serde_json::from_slice(&wrong_password_body).unwrap();
    assert_eq!(body["message"], "Invalid credentials");
}

#[actix_rt::test]
async fn test_profile_read_and_partial_update() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);
    let email = unique_email("profile");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": email,
            "password": "secret1",
            "first_name": "Jo",
            "last_name": "Do"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Read the profile
    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["email"], email);
    assert_eq!(profile["first_name"], "Jo");
    assert_eq!(profile["last_name"], "Do");

    // Update only the first name; the last name must be left untouched.
    let req = test::TestRequest::put()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "first_name": "Maria" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["first_name"], "Maria");
    assert_eq!(body["user"]["last_name"], "Do");
    assert_eq!(body["user"]["email"], email);
}

#[actix_rt::test]
async fn test_protected_routes_require_a_token() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);

    // No Authorization header at all
    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    match resp {
        Ok(resp) => assert_eq!(resp.status(), 401),
        Err(err) => assert_eq!(err.error_response().status(), 401),
    }

    // Garbage token
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    match resp {
        Ok(resp) => assert_eq!(resp.status(), 401),
        Err(err) => assert_eq!(err.error_response().status(), 401),
    }
}

#[actix_rt::test]
async fn test_expired_token_is_rejected_even_with_valid_signature() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);

    // Correctly signed with the server's secret, but already expired.
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: "expired@example.com".to_string(),
        iat: (now - Duration::hours(3)).timestamp(),
        exp: (now - Duration::hours(2)).timestamp(),
    };
    let expired_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", expired_token)))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    match resp {
        Ok(resp) => assert_eq!(resp.status(), 401),
        Err(err) => assert_eq!(err.error_response().status(), 401),
    }
}

#[actix_rt::test]
async fn test_public_auth_routes_bypass_the_gate() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let app = test_app!(pool);

    // Logout needs no token and succeeds statelessly.
    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logout successful");

    // Health is outside /api entirely.
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
