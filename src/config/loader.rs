// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::model::{ENV_MAX_OPEN_PROCESSES, ENV_VERIFY, Settings};
use crate::config::validate::validate_settings;
use crate::errors::{ProcguardError, Result};

/// Load settings from a TOML file.
///
/// This only performs TOML deserialization; it does **not** validate the
/// values. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let settings: Settings = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load settings from a file, overlay environment overrides, then validate.
///
/// This is the recommended entry point for hosts that ship a settings file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let settings = load_from_path(&path)?;
    let settings = apply_env(settings, |key| std::env::var(key).ok())?;
    validate_settings(&settings)?;
    Ok(settings)
}

impl Settings {
    /// Defaults overlaid with the process environment.
    ///
    /// Invalid environment values are logged and ignored so the default
    /// context can always be built.
    pub fn from_env() -> Self {
        match apply_env(Settings::default(), |key| std::env::var(key).ok())
            .and_then(|s| validate_settings(&s).map(|_| s))
        {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "ignoring invalid procguard environment settings");
                Settings::default()
            }
        }
    }
}

/// Overlay `PROCGUARD_*` overrides obtained through `lookup`.
pub fn apply_env<F>(mut settings: Settings, lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_MAX_OPEN_PROCESSES) {
        let limit = raw.trim().parse::<usize>().map_err(|e| {
            ProcguardError::Config(format!("{ENV_MAX_OPEN_PROCESSES}={raw:?} is not a number: {e}"))
        })?;
        debug!(limit, "process limit overridden from environment");
        settings.max_open_processes = limit;
    }

    if let Some(raw) = lookup(ENV_VERIFY) {
        settings.verify_strategy = raw.parse().map_err(ProcguardError::Config)?;
    }

    Ok(settings)
}
