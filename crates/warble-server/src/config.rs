use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;
use warble_avatar::PaletteMode;
use warble_store::DEFAULT_SESSION_TTL;
use warble_store::users::DEFAULT_GUEST_ATTEMPTS;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub app_name: String,
    pub seed_demo: bool,
    pub avatar_palette: PaletteMode,
    pub guest_attempts: usize,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: var_or("WARBLE_HOST", "0.0.0.0"),
            port: parse_var("WARBLE_PORT", 3000)?,
            app_name: var_or("WARBLE_APP_NAME", "BirdIsDaWord"),
            seed_demo: parse_var("WARBLE_SEED_DEMO", true)?,
            avatar_palette: parse_palette(&var_or("WARBLE_AVATAR_PALETTE", "random"))?,
            guest_attempts: positive(
                "WARBLE_GUEST_ATTEMPTS",
                parse_var("WARBLE_GUEST_ATTEMPTS", DEFAULT_GUEST_ATTEMPTS)?,
            )?,
            session_ttl: Duration::from_secs(positive(
                "WARBLE_SESSION_TTL_SECS",
                parse_var("WARBLE_SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?,
            )?),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn positive<T>(key: &str, value: T) -> Result<T>
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        bail!("invalid {key} value: {value} (must be greater than zero)");
    }
    Ok(value)
}

fn parse_palette(raw: &str) -> Result<PaletteMode> {
    match raw.to_ascii_lowercase().as_str() {
        "random" => Ok(PaletteMode::Random),
        "letter" => Ok(PaletteMode::ByLetter),
        other => bail!("invalid WARBLE_AVATAR_PALETTE value: {other} (expected random or letter)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_names() {
        assert_eq!(parse_palette("random").unwrap(), PaletteMode::Random);
        assert_eq!(parse_palette("LETTER").unwrap(), PaletteMode::ByLetter);
        assert!(parse_palette("rainbow").is_err());
    }

    #[test]
    fn zero_counts_rejected() {
        assert!(positive("WARBLE_GUEST_ATTEMPTS", 0usize).is_err());
        assert!(positive("WARBLE_SESSION_TTL_SECS", 0u64).is_err());
        assert_eq!(positive("WARBLE_GUEST_ATTEMPTS", 16usize).unwrap(), 16);
    }
}
