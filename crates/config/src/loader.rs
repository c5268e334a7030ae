use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::LeadlineConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "leadline.toml";

/// Load config from the given TOML path with env substitution.
pub fn load_config(path: &Path) -> anyhow::Result<LeadlineConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./leadline.toml` (project-local)
/// 2. `~/.config/leadline/leadline.toml` (user-global)
///
/// Returns `LeadlineConfig::default()` if no config file is found.
pub fn discover_and_load() -> LeadlineConfig {
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
    LeadlineConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    // User-global: ~/.config/leadline/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "leadline") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadline.toml");
        std::fs::write(&path, "[store]\nurl = \"redis://test:6379\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.store.url, "redis://test:6379");
        // Untouched sections keep their defaults.
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadline.toml");
        std::fs::write(&path, "[server\nport = oops").unwrap();
        assert!(load_config(&path).is_err());
    }
}
