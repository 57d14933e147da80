//! Runtime configuration for the TopDecked server.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    /// Postgres pool size.
    pub db_max_connections: u32,
    pub server_addr: String,
    /// Prefix every REST resource is mounted under (e.g. `/api`).
    pub api_prefix: String,
    /// CORS allow-list; empty means no cross-origin access.
    pub allowed_origins: Vec<String>,
    pub security: SecuritySettings,
    pub mail: MailSettings,
    pub frontend_url: String,
    pub frontend_port: Option<String>,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: String,
}

#[derive(Debug, Clone)]
pub struct SecuritySettings {
    pub secret_key: String,
    /// JWT algorithm name, e.g. `HS256`.
    pub algorithm: String,
    /// Access-token lifetime (minutes).
    pub token_expiration: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    pub username: String,
    pub password: String,
    pub from: String,
    /// SMTP relay host (STARTTLS).
    pub server: String,
    pub port: u16,
}

impl MailSettings {
    /// SMTP is used only when a relay and its credentials are configured.
    pub fn smtp_enabled(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.server.is_empty()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = required("DATABASE_URL")?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
        let api_prefix = normalize_prefix(&env::var("API_PREFIX").unwrap_or_else(|_| "/api".into()));
        let allowed_origins = parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default());

        let security = SecuritySettings {
            secret_key: required("SECURITY_SECRET_KEY")?,
            algorithm: env::var("SECURITY_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            token_expiration: env::var("SECURITY_TOKEN_EXPIRATION")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };

        let mail = MailSettings {
            username: env::var("MAIL_USERNAME").unwrap_or_default(),
            password: env::var("MAIL_PASSWORD").unwrap_or_default(),
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@topdecked.local".into()),
            server: env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".into()),
            port: env::var("MAIL_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
        };

        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| "localhost".into());
        let frontend_port = env::var("FRONTEND_PORT").ok().filter(|p| !p.is_empty());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        Ok(Settings {
            database_url,
            db_max_connections,
            server_addr,
            api_prefix,
            allowed_origins,
            security,
            mail,
            frontend_url,
            frontend_port,
            upload_dir,
        })
    }

    /// Where the browser lands after confirming an email address.
    pub fn frontend_location(&self) -> String {
        let base = if self.frontend_url.starts_with("http://")
            || self.frontend_url.starts_with("https://")
        {
            self.frontend_url.clone()
        } else {
            format!("http://{}", self.frontend_url)
        };
        match &self.frontend_port {
            Some(port) => format!("{base}:{port}"),
            None => base,
        }
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

/// `"a.com, b.com"` → `["a.com", "b.com"]`; blank entries are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Ensures a leading slash and no trailing slash (`"api/"` → `"/api"`).
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
