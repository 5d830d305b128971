use std::env;
use chrono_tz::Tz;
use crate::domain::services::password::PasswordScheme;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub salt_secret: String,
    pub password_scheme: PasswordScheme,
    pub identity_url: Option<String>,
    pub identity_api_key: Option<String>,
    pub identity_service_key: Option<String>,
    pub identity_email_domain: String,
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://trainer-desk.db?mode=rwc".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            salt_secret: env::var("APP_SALT_SECRET").unwrap_or_else(|_| "_trainer_salt_2024".to_string()),
            password_scheme: env::var("PASSWORD_SCHEME")
                .map(|s| s.parse().expect("PASSWORD_SCHEME must be 'sha256' or 'argon2'"))
                .unwrap_or(PasswordScheme::Sha256),
            identity_url: env::var("IDENTITY_URL").ok(),
            identity_api_key: env::var("IDENTITY_API_KEY").ok(),
            identity_service_key: env::var("IDENTITY_SERVICE_KEY").ok(),
            identity_email_domain: env::var("IDENTITY_EMAIL_DOMAIN").unwrap_or_else(|_| "@trainer.app".to_string()),
            timezone: env::var("TRAINER_TIMEZONE")
                .map(|s| s.parse().expect("TRAINER_TIMEZONE must be an IANA zone name"))
                .unwrap_or(chrono_tz::UTC),
        }
    }

    /// A Postgres URL means the hosted backend; everything else is local.
    pub fn is_hosted(&self) -> bool {
        self.database_url.starts_with("postgres://") || self.database_url.starts_with("postgresql://")
    }
}
