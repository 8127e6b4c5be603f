//! Knowledge-base configuration.
//!
//! # Responsibility
//! - Load `oh-my-til.json` from the vault base directory.
//! - Resolve the effective notes root used to scope queries.
//!
//! # Invariants
//! - Loading never fails: missing, unreadable, malformed or non-object
//!   documents all produce `KnowledgeBaseConfig::default()`.
//! - The effective root is never blank and carries no trailing `/`.

use crate::model::topic::strip_root;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Config file name at the vault base.
pub const CONFIG_FILE_NAME: &str = "oh-my-til.json";
/// Root folder used when no configuration names one.
pub const DEFAULT_TIL_PATH: &str = "til";

/// Site deployment settings carried alongside the core settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(rename = "til-path", default, skip_serializing_if = "Option::is_none")]
    pub til_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// Parsed `oh-my-til.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(rename = "til-path", default, skip_serializing_if = "Option::is_none")]
    pub til_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployConfig>,
}

impl KnowledgeBaseConfig {
    /// Effective notes root: `til-path`, then `deploy.til-path`, then `til`.
    pub fn til_root(&self) -> TilRoot {
        let configured = self
            .til_path
            .as_deref()
            .or_else(|| self.deploy.as_ref().and_then(|d| d.til_path.as_deref()));
        TilRoot::new(configured.unwrap_or(DEFAULT_TIL_PATH))
    }
}

/// Config parse failure; always recovered by the loader.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAnObject,
}

impl ConfigError {
    fn reason(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::NotAnObject => "not_object",
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config read failed: {err}"),
            Self::Json(err) => write!(f, "config is not valid JSON: {err}"),
            Self::NotAnObject => write!(f, "config root must be a JSON object"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotAnObject => None,
        }
    }
}

/// Loads `oh-my-til.json` from `base_path`, falling back to defaults.
pub fn load_config(base_path: &Path) -> KnowledgeBaseConfig {
    match read_config(&base_path.join(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("event=config_load module=config status=default reason=missing");
            KnowledgeBaseConfig::default()
        }
        Err(err) => {
            warn!(
                "event=config_load module=config status=default reason={}",
                err.reason()
            );
            KnowledgeBaseConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<KnowledgeBaseConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&raw)
}

/// Parses one config document.
///
/// Unknown keys are ignored; a present key of the wrong type drops only
/// that key.
pub fn parse_config(raw: &str) -> Result<KnowledgeBaseConfig, ConfigError> {
    let value: Value = serde_json::from_str(raw).map_err(ConfigError::Json)?;
    let Value::Object(map) = value else {
        return Err(ConfigError::NotAnObject);
    };

    Ok(KnowledgeBaseConfig {
        til_path: string_field(map.get("til-path")),
        mode: string_field(map.get("mode")),
        deploy: map
            .get("deploy")
            .and_then(|deploy| serde_json::from_value(deploy.clone()).ok()),
    })
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

/// Normalized notes root prefix (`til`, `learning/til`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilRoot(String);

impl TilRoot {
    /// Normalizes `root`: trims whitespace and slashes, blank → `til`.
    pub fn new(root: &str) -> Self {
        let trimmed = root.trim().trim_matches('/');
        if trimmed.is_empty() {
            Self(DEFAULT_TIL_PATH.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `root/` prefix used for path matching.
    pub fn prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// Returns whether `path` lies below the root.
    pub fn contains(&self, path: &str) -> bool {
        self.relative(path).is_some()
    }

    /// Returns `path` with the root prefix removed.
    pub fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        strip_root(path, &self.0)
    }
}

impl Default for TilRoot {
    fn default() -> Self {
        Self::new(DEFAULT_TIL_PATH)
    }
}

impl Display for TilRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_config, ConfigError, KnowledgeBaseConfig, TilRoot};

    #[test]
    fn defaults_to_til_root() {
        assert_eq!(KnowledgeBaseConfig::default().til_root().as_str(), "til");
    }

    #[test]
    fn top_level_root_wins_over_deploy_root() {
        let config =
            parse_config(r#"{"til-path":"notes/","deploy":{"til-path":"other"}}"#).unwrap();
        assert_eq!(config.til_root().as_str(), "notes");

        let config = parse_config(r#"{"deploy":{"til-path":"learning/til"}}"#).unwrap();
        assert_eq!(config.til_root().as_str(), "learning/til");
    }

    #[test]
    fn wrong_typed_fields_are_dropped() {
        let config = parse_config(r#"{"mode":3,"deploy":"x","til-path":"til"}"#).unwrap();
        assert_eq!(config.mode, None);
        assert_eq!(config.deploy, None);
        assert_eq!(config.til_path.as_deref(), Some("til"));
    }

    #[test]
    fn arrays_and_garbage_are_rejected() {
        assert!(matches!(parse_config("[1,2,3]"), Err(ConfigError::NotAnObject)));
        assert!(matches!(parse_config("not json{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn root_matching_respects_segment_boundaries() {
        let root = TilRoot::new(" /til/ ");
        assert_eq!(root.prefix(), "til/");
        assert!(root.contains("til/go/a.md"));
        assert!(!root.contains("tilde/a.md"));
        assert!(!root.contains("til"));
        assert_eq!(TilRoot::new("  ").as_str(), "til");
    }
}
