//! # chota-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ChotaSettings::default()`]
//! 2. **User file**: `~/.chota/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `CHOTA_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use chota_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("model: {}", settings.generation.model_id);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<ChotaSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.chota/settings.json` with env var
/// overrides. If loading fails, returns compiled defaults.
pub fn get_settings() -> &'static ChotaSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            ChotaSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Binaries call this after logging is up so load failures can be reported.
/// Returns the settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: ChotaSettings) -> std::result::Result<(), ChotaSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = ChotaSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = ChotaSettings::default();
        assert_eq!(settings.generation.model_id, "gemini-2.5-flash");
        assert_eq!(settings.generation.top_k, 64);
        assert_eq!(
            settings.api.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(settings.logging.level, "warn");
        assert!(settings.generation.validate().is_ok());
    }

    #[test]
    fn init_settings_only_takes_effect_once() {
        let custom = ChotaSettings {
            logging: LoggingSettings {
                level: "trace".into(),
                json: true,
            },
            ..Default::default()
        };
        // another test may have populated the global first
        match init_settings(custom.clone()) {
            Ok(()) => assert_eq!(get_settings(), &custom),
            Err(back) => assert_eq!(back, custom),
        }
        assert_eq!(init_settings(custom.clone()), Err(custom));
    }

    #[test]
    fn get_settings_is_cached() {
        let a: *const ChotaSettings = get_settings();
        let b: *const ChotaSettings = get_settings();
        assert_eq!(a, b);
    }
}
