//! Connections to the live database inspected by `--update`.
//!
//! The command line takes a JDBC URL plus separate credentials. Only
//! PostgreSQL URLs can be inspected:
//!
//! - `jdbc:postgresql://host[:port]/database[?param=value&...]`
//! - `jdbc:postgresql:database` (localhost)
//!
//! The URL is turned into a key-value `may_postgres` connection string so that
//! passwords never need URL escaping.

use crate::error::ExportError;
use may_postgres::{Client, Error as PostgresError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

static POSTGRES_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^jdbc:postgresql:(?://(?P<host>[^:/?]+)(?::(?P<port>\d+))?/)?(?P<db>[^/?]+)(?:\?(?P<params>.*))?$",
    )
    .expect("valid JDBC URL pattern")
});

/// Connection error type
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Network/authentication/query error from may_postgres
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),
    /// Other connection errors
    #[error("Connection error: {0}")]
    Other(String),
}

/// Database location and credentials given to `--update`
#[derive(Clone, PartialEq, Eq)]
pub struct JdbcCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl JdbcCredentials {
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for JdbcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JdbcCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Parsed PostgreSQL location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    /// Driver options carried over from the URL query string
    pub options: Vec<(String, String)>,
}

impl PostgresTarget {
    /// Key-value connection string with every value quoted
    pub fn connection_string(&self, username: &str, password: &str) -> String {
        let mut parts = vec![
            format!("host={}", quote_value(&self.host)),
            format!("port={}", self.port),
            format!("dbname={}", quote_value(&self.database)),
            format!("user={}", quote_value(username)),
        ];
        if !password.is_empty() {
            parts.push(format!("password={}", quote_value(password)));
        }
        for (key, value) in &self.options {
            parts.push(format!("{}={}", key, quote_value(value)));
        }
        parts.join(" ")
    }
}

/// Parse a `jdbc:postgresql:` URL
pub fn parse_jdbc_url(url: &str) -> Result<PostgresTarget, ExportError> {
    let caps = POSTGRES_URL
        .captures(url.trim())
        .ok_or_else(|| ExportError::UnsupportedJdbcUrl(url.to_string()))?;

    let host = caps
        .name("host")
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match caps.name("port") {
        Some(m) => m
            .as_str()
            .parse::<u16>()
            .map_err(|_| ExportError::UnsupportedJdbcUrl(url.to_string()))?,
        None => DEFAULT_PORT,
    };
    let database = caps["db"].to_string();

    let mut options = Vec::new();
    if let Some(params) = caps.name("params") {
        for pair in params.as_str().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match driver_option(key) {
                Some(option) => options.push((option.to_string(), value.to_string())),
                None => log::debug!("Ignoring JDBC URL parameter '{}'", key),
            }
        }
    }

    Ok(PostgresTarget {
        host,
        port,
        database,
        options,
    })
}

/// Driver option for a JDBC URL parameter
fn driver_option(jdbc_param: &str) -> Option<&'static str> {
    match jdbc_param {
        "sslmode" => Some("sslmode"),
        "connectTimeout" => Some("connect_timeout"),
        "ApplicationName" => Some("application_name"),
        "options" => Some("options"),
        _ => None,
    }
}

fn quote_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Establishes a connection for `credentials`
///
/// This is a blocking call; the driver's own defaults bound the connect time
/// unless the URL sets `connectTimeout`.
pub fn connect(credentials: &JdbcCredentials) -> Result<Client, ExportError> {
    let target = parse_jdbc_url(&credentials.url)?;
    log::info!(
        "Connecting to {}:{}/{} as {}",
        target.host,
        target.port,
        target.database,
        credentials.username
    );

    let start = Instant::now();
    let client = may_postgres::connect(&target.connection_string(&credentials.username, &credentials.password))
        .map_err(ConnectionError::from)?;
    log::debug!("Connected in {:?}", start.elapsed());

    Ok(client)
}
