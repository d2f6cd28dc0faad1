// src/config/validate.rs

use crate::config::model::Settings;
use crate::errors::{ProcguardError, Result};

/// Check the invariants `Settings` relies on.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_process_limit(settings)?;
    Ok(())
}

fn validate_process_limit(settings: &Settings) -> Result<()> {
    if settings.max_open_processes == 0 {
        return Err(ProcguardError::Config(
            "max_open_processes must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_rejected() {
        let settings = Settings::default().with_max_open_processes(0);
        match validate_settings(&settings) {
            Err(ProcguardError::Config(msg)) => assert!(msg.contains("max_open_processes")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }
}
