use crate::error::AppError;
use std::env;

/// Runtime configuration loaded from the environment.
///
/// `DATABASE_URL`, `JWT_SECRET` and `JWT_EXPIRES_HOURS` are required: a missing
/// or malformed value is a server misconfiguration, and the binary refuses to
/// start rather than falling back to a weak default secret.
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".into()))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET must be set".into()))?;
        if jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET must not be empty".into()));
        }

        let jwt_expires_hours = env::var("JWT_EXPIRES_HOURS")
            .map_err(|_| AppError::Config("JWT_EXPIRES_HOURS must be set".into()))?
            .parse::<i64>()
            .map_err(|_| AppError::Config("JWT_EXPIRES_HOURS must be a number of hours".into()))?;
        if jwt_expires_hours <= 0 {
            return Err(AppError::Config("JWT_EXPIRES_HOURS must be positive".into()));
        }

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Config("SERVER_PORT must be a number".into()))?;
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expires_hours,
            server_port,
            server_host,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
