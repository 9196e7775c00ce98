//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ChotaSettings::default()`]
//! 2. If `~/.chota/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the generation config
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use chota_core::config::MAX_THINKING_BUDGET;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ChotaSettings;

/// Resolve the path to the settings file (`~/.chota/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".chota").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ChotaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an out-of-range
/// generation value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ChotaSettings> {
    let defaults = serde_json::to_value(ChotaSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ChotaSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.generation.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Out-of-range or unparsable values are ignored with a warning.
pub fn apply_env_overrides(settings: &mut ChotaSettings) {
    // ── Generation ──────────────────────────────────────────────────
    let generation = &mut settings.generation;
    if let Some(v) = read_env_string("CHOTA_MODEL") {
        generation.model_id = v;
    }
    if let Some(v) = read_env_f64("CHOTA_TEMPERATURE", 0.0, 2.0) {
        generation.temperature = v;
    }
    if let Some(v) = read_env_u32("CHOTA_TOP_K", 1, 100) {
        generation.top_k = v;
    }
    if let Some(v) = read_env_f64("CHOTA_TOP_P", 0.0, 1.0) {
        generation.top_p = v;
    }
    // Present-but-empty clears the system instruction.
    if let Ok(v) = std::env::var("CHOTA_SYSTEM_INSTRUCTION") {
        generation.system_instruction = v;
    }
    if let Some(v) = read_env_bool("CHOTA_USE_SEARCH") {
        generation.use_search = v;
    }
    if let Some(v) = read_env_bool("CHOTA_USE_THINKING") {
        generation.use_thinking = v;
    }
    if let Some(v) = read_env_u32("CHOTA_THINKING_BUDGET", 0, MAX_THINKING_BUDGET) {
        generation.thinking_budget = v;
    }

    // ── API ─────────────────────────────────────────────────────────
    if let Some(v) = read_env_string("CHOTA_BASE_URL") {
        settings.api.base_url = v.trim_end_matches('/').to_string();
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("CHOTA_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("CHOTA_LOG_JSON") {
        settings.logging.json = v;
    }
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

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a finite `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    let val = std::env::var(name).ok()?;
    let result = parse_f64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid float env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
