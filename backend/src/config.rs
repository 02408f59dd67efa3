//! Runtime configuration from environment variables.
//!
//! `.env` is loaded by the binary before [`AppConfig::from_env`] runs.
//!
//! | Variable                      | Default  |
//! |-------------------------------|----------|
//! | `CURRICULUM_PORT`             | `3000`   |
//! | `CURRICULUM_MAX_UPLOAD_BYTES` | 50 MiB   |
//! | `CURRICULUM_LOG_PREVIEW_ROWS` | `3`      |
//! | `CURRICULUM_ALIASES_FILE`     | built-in |

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::transform::aliases::ResolverConfig;
use crate::transform::pipeline::ImportOptions;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_LOG_PREVIEW_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub log_preview_rows: usize,
    pub aliases: ResolverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_preview_rows: DEFAULT_LOG_PREVIEW_ROWS,
            aliases: ResolverConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let aliases = match lookup("CURRICULUM_ALIASES_FILE") {
            Some(path) => load_aliases(PathBuf::from(path))?,
            None => ResolverConfig::default(),
        };

        Ok(Self {
            port: parse_var(&lookup, "CURRICULUM_PORT", DEFAULT_PORT)?,
            max_upload_bytes: parse_var(
                &lookup,
                "CURRICULUM_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            log_preview_rows: parse_var(
                &lookup,
                "CURRICULUM_LOG_PREVIEW_ROWS",
                DEFAULT_LOG_PREVIEW_ROWS,
            )?,
            aliases,
        })
    }

    /// Import options seeded from this configuration.
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            log_preview_rows: self.log_preview_rows,
            aliases: self.aliases.clone(),
            ..ImportOptions::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        }),
    }
}

fn load_aliases(path: PathBuf) -> Result<ResolverConfig, ConfigError> {
    let json = std::fs::read_to_string(&path).map_err(|e| ConfigError {
        key: "CURRICULUM_ALIASES_FILE".to_string(),
        value: path.display().to_string(),
        message: e.to_string(),
    })?;
    ResolverConfig::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.log_preview_rows, 3);
        assert_eq!(config.aliases, ResolverConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CURRICULUM_PORT", "8080"),
            ("CURRICULUM_MAX_UPLOAD_BYTES", " 1024 "),
            ("CURRICULUM_LOG_PREVIEW_ROWS", ""),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.log_preview_rows, 3);
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup(&[("CURRICULUM_PORT", "abc")])).unwrap_err();
        assert_eq!(err.key, "CURRICULUM_PORT");
        assert_eq!(err.value, "abc");
    }

    #[test]
    fn test_aliases_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        std::fs::write(&path, r#"{ "front": ["frente", "bloco"] }"#).unwrap();

        let config = AppConfig::from_lookup(lookup(&[(
            "CURRICULUM_ALIASES_FILE",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        assert_eq!(config.aliases.front, vec!["frente", "bloco"]);
        assert_eq!(config.aliases.discipline, ResolverConfig::default().discipline);
    }

    #[test]
    fn test_missing_aliases_file() {
        let err = AppConfig::from_lookup(lookup(&[("CURRICULUM_ALIASES_FILE", "/nope/x.json")]))
            .unwrap_err();
        assert_eq!(err.key, "CURRICULUM_ALIASES_FILE");
    }

    #[test]
    fn test_import_options_seeded() {
        let config = AppConfig {
            log_preview_rows: 7,
            ..AppConfig::default()
        };
        let options = config.import_options();
        assert_eq!(options.log_preview_rows, 7);
        assert!(options.course_id.is_none());
    }
}
