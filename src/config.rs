use std::net::SocketAddr;

use anyhow::Context;

/// Minimum length accepted for `SESSION_SECRET`; the cookie signing key is
/// derived from it and key derivation rejects shorter master keys.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub session_secret: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let tmdb_access_token =
            std::env::var("TMDB_ACCESS_TOKEN").context("TMDB_ACCESS_TOKEN must be set")?;
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string());

        let session_secret =
            std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;

        let http_timeout_secs: u64 =
            std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(30);

        let config = Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base_url,
            session_secret,
            http_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.tmdb_access_token.trim().is_empty(),
            "TMDB_ACCESS_TOKEN must not be empty"
        );
        anyhow::ensure!(
            self.session_secret.len() >= MIN_SESSION_SECRET_LEN,
            "SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes"
        );
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(tmdb_base_url: &str) -> Self {
        Self {
            addr: "127.0.0.1:0".parse().expect("static addr"),
            database_url: "sqlite::memory:".to_string(),
            tmdb_access_token: "test-token".to_string(),
            tmdb_base_url: tmdb_base_url.to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            session_secret: "x".repeat(MIN_SESSION_SECRET_LEN),
            http_timeout_secs: 5,
        }
    }
}
