use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::LockstashConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "lockstash.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<LockstashConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let config = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./lockstash.toml` (project-local)
/// 2. `~/.config/lockstash/lockstash.toml` (user-global)
///
/// Returns `LockstashConfig::default()` if no config file is found.
pub fn discover_and_load() -> LockstashConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    LockstashConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dir) = config_dir() {
        let p = dir.join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/lockstash/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lockstash").map(|d| d.config_dir().to_path_buf())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[auth]\nmin_password_len = 10\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.auth.min_password_len, 10);
        // Untouched sections fall back to defaults.
        assert_eq!(cfg.database.path, "lockstash.db");
    }

    #[test]
    fn load_config_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_config_bad_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "this is not toml [").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
