//! Settings loading with environment variable overrides.
//!
//! Scalar overrides use strict parsing: a value that does not parse, or
//! falls outside its range, is ignored with a warning and the default
//! stays. Invalid values that select where sessions live (`TABLE_NAME`,
//! `PARLEY_STORE`) are hard errors.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{Settings, StoreBackend};

/// Load defaults and apply overrides from the process environment.
pub fn load_settings() -> Result<Settings> {
    let mut settings = Settings::default();
    apply_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

/// Apply overrides from `lookup` (normally `std::env::var`).
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read("PARLEY_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("PARLEY_PORT") {
        match parse_u16_range(&v, 1, 65535) {
            Some(port) => settings.server.port = port,
            None => warn!(key = "PARLEY_PORT", value = %v, "invalid port, ignoring"),
        }
    }
    if let Some(v) = read("PARLEY_EXPOSE_ERRORS") {
        match parse_bool(&v) {
            Some(b) => settings.server.expose_internal_errors = b,
            None => warn!(key = "PARLEY_EXPOSE_ERRORS", value = %v, "invalid boolean, ignoring"),
        }
    }

    // ── Inference ───────────────────────────────────────────────────
    if let Some(v) = read("MODEL_ID") {
        settings.inference.model_id = v;
    }
    if let Some(v) = read("AWS_REGION") {
        settings.inference.region = v;
    }
    if let Some(v) = read("BEDROCK_ENDPOINT") {
        settings.inference.endpoint = Some(v);
    }
    if let Some(v) = read("AWS_BEARER_TOKEN_BEDROCK") {
        settings.inference.api_token = Some(SecretString::from(v));
    }
    if let Some(v) = read("PARLEY_INFERENCE_TIMEOUT_SECS") {
        match parse_u64_range(&v, 1, 900) {
            Some(secs) => settings.inference.timeout_secs = secs,
            None => warn!(key = "PARLEY_INFERENCE_TIMEOUT_SECS", value = %v, "invalid timeout, ignoring"),
        }
    }

    // ── Store ───────────────────────────────────────────────────────
    if let Some(v) = read("TABLE_NAME") {
        if !is_valid_table_name(&v) {
            return Err(SettingsError::InvalidTableName(v));
        }
        settings.store.table_name = v;
    }
    if let Some(v) = read("PARLEY_STORE") {
        settings.store.backend = v
            .parse::<StoreBackend>()
            .map_err(SettingsError::UnknownStoreBackend)?;
    }
    if let Some(v) = read("PARLEY_DB_PATH") {
        settings.store.db_path = PathBuf::from(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read("PARLEY_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("PARLEY_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => warn!(key = "PARLEY_LOG_JSON", value = %v, "invalid boolean, ignoring"),
        }
    }

    debug!(
        model_id = %settings.inference.model_id,
        table = %settings.store.table_name,
        backend = ?settings.store.backend,
        "settings resolved"
    );
    Ok(())
}

/// Deployment-style table names: 3 to 255 of `[A-Za-z0-9_.-]`, e.g.
/// `InfraStack-SessionTable1A2B`. SQLite reserves the `sqlite_` prefix.
pub fn is_valid_table_name(name: &str) -> bool {
    (3..=255).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !name.to_ascii_lowercase().starts_with("sqlite_")
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
