//! Service configuration loaded from the environment

use crate::error::ValuationError;
use crate::models::{Horizon, Multiple, DEFAULT_HORIZON_MONTHS, DEFAULT_MULTIPLE};
use crate::Result;
use axum::http::HeaderValue;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_TEMPLATE_PATH: &str = "public/Cash_Flow_Template.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            _ => Environment::Production,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub max_upload_bytes: usize,
    pub horizon: Horizon,
    pub multiple: Multiple,
    /// Reject uploads whose row count differs from the horizon
    pub strict_horizon: bool,
    pub template_path: PathBuf,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build config from process environment (call `dotenv` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup; `from_env` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let horizon_months: usize =
            parse_var(&lookup, "HORIZON_MONTHS")?.unwrap_or(DEFAULT_HORIZON_MONTHS);
        let multiple: f64 = parse_var(&lookup, "VALUATION_MULTIPLE")?.unwrap_or(DEFAULT_MULTIPLE);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            environment: lookup("APP_ENV")
                .or_else(|| lookup("NODE_ENV"))
                .map(|raw| Environment::parse(&raw))
                .unwrap_or(defaults.environment),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            horizon: Horizon::new(horizon_months)
                .map_err(|e| ValuationError::Config(format!("HORIZON_MONTHS: {}", e)))?,
            multiple: Multiple::new(multiple)
                .map_err(|e| ValuationError::Config(format!("VALUATION_MULTIPLE: {}", e)))?,
            strict_horizon: parse_var(&lookup, "STRICT_HORIZON")?
                .unwrap_or(defaults.strict_horizon),
            template_path: lookup("TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            cors_origins: match lookup("CORS_ORIGINS") {
                Some(raw) => parse_cors_origins(&raw)?,
                None => defaults.cors_origins,
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ceiling for whole request bodies. Leaves room above the per-file
    /// limit so oversize files reach the handler and get a precise 400.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(4)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: Environment::Production,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            horizon: Horizon::default(),
            multiple: Multiple::default(),
            strict_horizon: false,
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Explicit origins only. Credentials are allowed, so a wildcard is refused.
fn parse_cors_origins(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(ValuationError::Config(
                    "CORS_ORIGINS cannot be '*' while credentials are allowed".into(),
                ));
            }
            origin
                .parse::<HeaderValue>()
                .map(|_| origin.to_string())
                .map_err(|_| ValuationError::Config(format!("Invalid CORS_ORIGINS entry: {}", origin)))
        })
        .collect()
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ValuationError::Config(format!("Invalid {}: {}", key, e))),
        _ => Ok(None),
    }
}
