use std::str::FromStr;

use anyhow::{Context, Result};

use crate::layout::PageTemplate;

/// Application configuration loaded from environment variables.
/// Every variable has a default; a value that fails to parse aborts startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default page template for plans that do not override capacity.
    pub page_height_px: f64,
    pub header_height_px: f64,
    pub content_width_px: f64,
    pub safety_margin_px: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let a4 = PageTemplate::a4_portrait();
        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            page_height_px: env_or("PRINT_PAGE_HEIGHT_PX", a4.page_height_px)?,
            header_height_px: env_or("PRINT_HEADER_HEIGHT_PX", a4.header_height_px)?,
            content_width_px: env_or("PRINT_CONTENT_WIDTH_PX", a4.content_width_px)?,
            safety_margin_px: env_or("PRINT_SAFETY_MARGIN_PX", a4.safety_margin_px)?,
        })
    }

    /// The configured page template. Its capacity is validated at startup.
    pub fn page_template(&self) -> PageTemplate {
        PageTemplate {
            page_height_px: self.page_height_px,
            header_height_px: self.header_height_px,
            content_width_px: self.content_width_px,
            safety_margin_px: self.safety_margin_px,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
}
