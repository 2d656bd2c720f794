use std::env;

use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

#[derive(Clone)]
pub struct R2Config {
    pub bucket: String,
    pub account_id: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub otp_ttl_minutes: i64,
    pub analytics_timezone: Tz,
    pub smtp: Option<SmtpConfig>,
    pub from_email: String,
    pub storage_type: String,
    pub upload_dir: String,
    pub r2: Option<R2Config>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let smtp = match env::var("SMTP_PASS") {
            Ok(pass) => Some(SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                user: required("SMTP_USER")?,
                pass,
            }),
            Err(_) => None,
        };

        let r2 = match (
            env::var("R2_BUCKET"),
            env::var("R2_ACCOUNT_ID"),
            env::var("R2_ACCESS_KEY"),
            env::var("R2_SECRET_KEY"),
            env::var("R2_PUBLIC_URL"),
        ) {
            (Ok(bucket), Ok(account_id), Ok(access_key), Ok(secret_key), Ok(public_url)) => Some(R2Config {
                bucket,
                account_id,
                access_key,
                secret_key,
                public_url,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            turso_auth_token: env::var("TURSO_AUTH_TOKEN").ok(),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24 * 7)?,
            otp_ttl_minutes: parsed("OTP_TTL_MINUTES", 10)?,
            analytics_timezone: parsed("ANALYTICS_TIMEZONE", Tz::UTC)?,
            smtp,
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| "no-reply@fooddelivery.app".to_string()),
            storage_type: env::var("STORAGE_TYPE").unwrap_or_else(|_| "local".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./static/uploads".to_string()),
            r2,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string()),
            port: parsed("PORT", 4000)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
