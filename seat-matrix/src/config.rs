//! Engine tuning and process configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DEFAULT_MAX_CONCURRENT;
use crate::schedule::{HALT_CORRECTION_LIMIT_MINS, ROLLOVER_THRESHOLD_MINS};
use crate::shohoz::{DEFAULT_BASE_URL, ShohozConfig};

/// Booking fee added to every ticket, in taka.
pub const SERVICE_CHARGE: u32 = 20;

/// Added to the base fare of berth classes when a fare is ingested, in taka.
pub const BERTH_SURCHARGE: u32 = 50;

/// Default lifetime of a built matrix in the store.
pub const DEFAULT_STORE_TTL: Duration = Duration::from_secs(15 * 60);

/// Tuning for the matrix and availability engines.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum remote calls in flight during a batch.
    pub max_concurrent: usize,

    /// A backwards step in stop times shorter than this (after wrapping
    /// past midnight) is an overnight rollover.
    pub rollover_threshold_mins: i64,

    /// Declared halts above this are recomputed from stop times.
    pub halt_limit_mins: i64,

    /// Per-ticket booking fee (taka).
    pub service_charge: u32,

    /// Surcharge on berth classes (taka).
    pub berth_surcharge: u32,
}

impl EngineConfig {
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_rollover_threshold_hours(mut self, hours: i64) -> Self {
        self.rollover_threshold_mins = hours * 60;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            rollover_threshold_mins: ROLLOVER_THRESHOLD_MINS,
            halt_limit_mins: HALT_CORRECTION_LIMIT_MINS,
            service_charge: SERVICE_CHARGE,
            berth_surcharge: BERTH_SURCHARGE,
        }
    }
}

/// A malformed environment variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server binary needs, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub shohoz: ShohozConfig,
    pub engine: EngineConfig,
    pub store_ttl: Duration,
    /// Read credentials from this JSON file instead of the environment.
    pub credentials_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = parse_or(&get, "SEAT_MATRIX_BIND", SocketAddr::from(([127, 0, 0, 1], 3000)))?;

        let shohoz = ShohozConfig::new()
            .with_base_url(get("SHOHOZ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            .with_timeout(parse_or(&get, "SHOHOZ_TIMEOUT_SECS", 30u64)?)
            .with_max_retries(parse_or(&get, "SHOHOZ_MAX_RETRIES", 1u32)?);

        let engine = EngineConfig::default()
            .with_max_concurrent(parse_or(&get, "SEAT_MATRIX_CONCURRENCY", DEFAULT_MAX_CONCURRENT)?)
            .with_rollover_threshold_hours(parse_or(
                &get,
                "SEAT_MATRIX_ROLLOVER_HOURS",
                ROLLOVER_THRESHOLD_MINS / 60,
            )?);

        let store_ttl = Duration::from_secs(parse_or(
            &get,
            "SEAT_MATRIX_STORE_TTL_SECS",
            DEFAULT_STORE_TTL.as_secs(),
        )?);

        Ok(Self {
            bind,
            shohoz,
            engine,
            store_ttl,
            credentials_file: get("SHOHOZ_CREDENTIALS_FILE").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
