//! Engine configuration: TOML files, environment overrides, defaults.
//!
//! Precedence: explicit path > `RESTLITE_CONFIG` > `~/.config/restlite.toml` >
//! `./restlite.toml` > defaults. Environment variables are applied last:
//! - `RESTLITE_ID_FIELD`
//! - `RESTLITE_COERCION` (`lenient` | `strict`)
//! - `RESTLITE_DEFAULT_LIMIT`
//! - `RESTLITE_MAX_LIMIT`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::RestError;
use crate::query::Coercion;

pub const DEFAULT_ID_FIELD: &str = "_id";
pub const CONFIG_FILE_NAME: &str = "restlite.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub id_field: String,
    pub coercion: Coercion,
    /// Applied to list reads that carry no valid `limit`.
    pub default_limit: Option<usize>,
    /// Upper bound for any list read.
    pub max_limit: Option<usize>,
    /// Whether the memory store stamps `createdAt` / `updatedAt`.
    pub timestamps: bool,
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            coercion: Coercion::default(),
            default_limit: None,
            max_limit: None,
            timestamps: false,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    /// error|warn|info|debug|trace
    pub level: Option<String>,
    pub retention: Option<usize>,
    pub dev6: bool,
}

impl EngineConfig {
    /// # Errors
    /// Returns `RestError::Config` when the text is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, RestError> {
        toml::from_str(s).map_err(|e| RestError::Config(e.to_string()))
    }

    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, RestError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| RestError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// First existing config file in precedence order, or defaults; then env overrides.
    ///
    /// # Errors
    /// Fails when an existing config file is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, RestError> {
        let mut cfg = Self::default();
        for p in candidate_paths(explicit) {
            if p.exists() {
                log::debug!("loading config from {}", p.display());
                cfg = Self::from_path(&p)?;
                break;
            }
        }
        cfg.apply_env_from(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Applies `RESTLITE_*` overrides read through `get`. Unparsable values are ignored.
    pub fn apply_env_from<F: Fn(&str) -> Option<String>>(&mut self, get: F) {
        if let Some(s) = get("RESTLITE_ID_FIELD").filter(|s| !s.trim().is_empty()) {
            self.id_field = s.trim().to_string();
        }
        match get("RESTLITE_COERCION").map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("strict") => self.coercion = Coercion::Strict,
            Some("lenient") => self.coercion = Coercion::Lenient,
            Some(other) => log::warn!("ignoring RESTLITE_COERCION={other}"),
            None => {}
        }
        if let Some(n) = get("RESTLITE_DEFAULT_LIMIT").and_then(|s| s.trim().parse().ok()) {
            self.default_limit = Some(n);
        }
        if let Some(n) = get("RESTLITE_MAX_LIMIT").and_then(|s| s.trim().parse().ok()) {
            self.max_limit = Some(n);
        }
    }

    /// The limit a list read actually uses.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<usize>) -> Option<usize> {
        effective_limit(requested, self.default_limit, self.max_limit)
    }
}

/// `requested`, else `default`, clamped to `max`; `max` alone still bounds the read.
#[must_use]
pub fn effective_limit(
    requested: Option<usize>,
    default: Option<usize>,
    max: Option<usize>,
) -> Option<usize> {
    match (requested.or(default), max) {
        (Some(l), Some(max)) => Some(l.min(max)),
        (None, Some(max)) => Some(max),
        (l, None) => l,
    }
}

fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("RESTLITE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE_NAME));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_with_partial_fields() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            id_field = "id"
            coercion = "strict"
            max_limit = 100

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.id_field, "id");
        assert_eq!(cfg.coercion, Coercion::Strict);
        assert_eq!(cfg.max_limit, Some(100));
        assert_eq!(cfg.default_limit, None);
        assert_eq!(cfg.log.level.as_deref(), Some("debug"));
        assert!(!cfg.log.dev6);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("id_field = [").unwrap_err();
        assert!(matches!(err, RestError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RESTLITE_ID_FIELD", "uid"),
            ("RESTLITE_COERCION", "STRICT"),
            ("RESTLITE_DEFAULT_LIMIT", "20"),
            ("RESTLITE_MAX_LIMIT", "nope"),
        ]
        .into_iter()
        .collect();
        let mut cfg = EngineConfig::default();
        cfg.apply_env_from(|k| env.get(k).map(|s| (*s).to_string()));
        assert_eq!(cfg.id_field, "uid");
        assert_eq!(cfg.coercion, Coercion::Strict);
        assert_eq!(cfg.default_limit, Some(20));
        assert_eq!(cfg.max_limit, None);
    }

    #[test]
    fn effective_limit_rules() {
        let mut cfg = EngineConfig::default();
        assert_eq!(cfg.effective_limit(None), None);
        assert_eq!(cfg.effective_limit(Some(5)), Some(5));
        cfg.default_limit = Some(10);
        cfg.max_limit = Some(50);
        assert_eq!(cfg.effective_limit(None), Some(10));
        assert_eq!(cfg.effective_limit(Some(500)), Some(50));
        cfg.default_limit = None;
        assert_eq!(cfg.effective_limit(None), Some(50));
    }

    #[test]
    fn load_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("custom.toml");
        std::fs::write(&p, "id_field = \"key\"\ntimestamps = true\n").unwrap();
        let cfg = EngineConfig::load(Some(&p)).unwrap();
        assert!(cfg.timestamps);
    }
}
