use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEFAULT_SESSION_SECRET: &str = "dev_session_secret_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub session_secret: SecretString,
    pub session_expiration_hours: i64,
    pub cookie_secure: bool,
    pub frontend_origin: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "eduportal-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            session_secret: SecretString::from(
                env::var("SESSION_SECRET").unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string()),
            ),
            session_expiration_hours: env::var("SESSION_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Rejects configurations that would sign sessions with a guessable secret.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let secret = self.session_secret.expose_secret();

        if secret == DEFAULT_SESSION_SECRET {
            return Err(AppError::ValidationError(
                "SESSION_SECRET is using the default value".to_string(),
            ));
        }

        if secret.len() < 32 {
            return Err(AppError::ValidationError(format!(
                "SESSION_SECRET is too short ({}). Must be at least 32 characters",
                secret.len()
            )));
        }

        if !self.cookie_secure {
            log::warn!("COOKIE_SECURE is off in production; session cookies will be sent over plain HTTP");
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "eduportal-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            session_secret: SecretString::from("test_session_secret_key".to_string()),
            session_expiration_hours: 1,
            cookie_secure: false,
            frontend_origin: "http://localhost:3000".to_string(),
            app_env: "test".to_string(),
        }
    }
}
