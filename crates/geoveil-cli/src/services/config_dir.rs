// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution and config loading.

use std::path::{Path, PathBuf};

use geoveil_core::{PipelineConfig, Result};
use tracing::{debug, info};

/// Return the application config directory. Not created here: a missing
/// directory simply means "use defaults".
pub fn config_dir() -> PathBuf {
    dirs_fallback().join("geoveil")
}

/// Where `geoveil` looks for its settings when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn dirs_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

/// Load settings: the explicit file if given (it must exist), else the
/// default config file if present, else built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Loading config");
        return PipelineConfig::from_json_file(path);
    }

    let path = default_config_path();
    if path.is_file() {
        info!(path = %path.display(), "Loading config");
        PipelineConfig::from_json_file(&path)
    } else {
        debug!(path = %path.display(), "No config file; using defaults");
        Ok(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoveil_core::{GeoveilError, RedactMethod};

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"redaction": {"method": "pixelate"}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.redaction.method, RedactMethod::Pixelate);
        assert_eq!(config.redaction.blur_kernel_size, 151);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/geoveil.json"))).unwrap_err();
        assert!(matches!(err, GeoveilError::Io(_)));
    }

    #[test]
    fn default_path_ends_in_geoveil_config() {
        assert!(default_config_path().ends_with("geoveil/config.json"));
    }
}
