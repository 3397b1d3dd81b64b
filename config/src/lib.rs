//! Builds a [`redteam_types::Configuration`] from loosely-typed input.
//!
//! Two entry points: [`from_map`] is the primary one — a name→value mapping
//! coerced against a [`Strategy`]'s defaults, the shape any host-language
//! binding can hand over. [`FileConfig`] is an addition layered on top,
//! reading the same shape from a TOML file at `~/.redteam/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use redteam_types::{Configuration, ConfigurationError, Strategy};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("key {key}: expected {expected}, got {value:?}")]
    Coercion {
        key: &'static str,
        expected: &'static str,
        value: ConfigValue,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}

/// A loosely-typed configuration value, the shape a name→value mapping from
/// any host-language binding would hand over.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Int(i64),
    UInt(u64),
    Bool(bool),
    Str(String),
}

fn coerce_usize(key: &'static str, value: &ConfigValue) -> Result<usize, ConfigError> {
    match value {
        ConfigValue::UInt(v) => Ok(*v as usize),
        ConfigValue::Int(v) if *v >= 0 => Ok(*v as usize),
        other => Err(ConfigError::Coercion {
            key,
            expected: "non-negative integer",
            value: other.clone(),
        }),
    }
}

fn coerce_i32(key: &'static str, value: &ConfigValue) -> Result<i32, ConfigError> {
    match value {
        ConfigValue::Int(v) => i32::try_from(*v).map_err(|_| ConfigError::Coercion {
            key,
            expected: "integer",
            value: value.clone(),
        }),
        ConfigValue::UInt(v) => i32::try_from(*v).map_err(|_| ConfigError::Coercion {
            key,
            expected: "integer",
            value: value.clone(),
        }),
        other => Err(ConfigError::Coercion {
            key,
            expected: "integer",
            value: other.clone(),
        }),
    }
}

fn coerce_u32(key: &'static str, value: &ConfigValue) -> Result<u32, ConfigError> {
    coerce_usize(key, value).and_then(|v| {
        u32::try_from(v).map_err(|_| ConfigError::Coercion {
            key,
            expected: "u32",
            value: value.clone(),
        })
    })
}

fn coerce_bool(key: &'static str, value: &ConfigValue) -> Result<bool, ConfigError> {
    match value {
        ConfigValue::Bool(v) => Ok(*v),
        other => Err(ConfigError::Coercion {
            key,
            expected: "bool",
            value: other.clone(),
        }),
    }
}

fn coerce_string(key: &'static str, value: &ConfigValue) -> Result<String, ConfigError> {
    match value {
        ConfigValue::Str(v) => Ok(v.clone()),
        other => Err(ConfigError::Coercion {
            key,
            expected: "string",
            value: other.clone(),
        }),
    }
}

/// Build a `Configuration` from a name→value mapping: recognized keys are
/// exactly the `Configuration` fields; unknown keys are ignored; missing
/// keys take `strategy`'s defaults; invalid coercions surface as a
/// construction-time `ConfigError`.
pub fn from_map(
    map: &HashMap<String, ConfigValue>,
    strategy: Strategy,
) -> Result<Configuration, ConfigError> {
    let defaults = strategy.defaults();

    macro_rules! field {
        ($key:literal, $coerce:ident, $default:expr) => {
            match map.get($key) {
                Some(v) => $coerce($key, v)?,
                None => $default,
            }
        };
    }

    let cfg = Configuration {
        goal: field!("goal", coerce_string, defaults.goal),
        target_str: field!("target_str", coerce_string, defaults.target_str),
        branching_factor: field!("branching_factor", coerce_usize, defaults.branching_factor),
        pruning: field!("pruning", coerce_bool, defaults.pruning),
        n_streams: field!("n_streams", coerce_usize, defaults.n_streams),
        depth: field!("depth", coerce_usize, defaults.depth),
        width: field!("width", coerce_usize, defaults.width),
        keep_last_n: field!("keep_last_n", coerce_usize, defaults.keep_last_n),
        judge_success_score: field!(
            "judge_success_score",
            coerce_i32,
            defaults.judge_success_score
        ),
        attack_max_attempts: field!(
            "attack_max_attempts",
            coerce_u32,
            defaults.attack_max_attempts
        ),
    };

    Ok(cfg.validated()?)
}

/// Loosely-typed on-disk shape: every field optional, layered over a
/// [`Strategy`]'s defaults by [`FileConfig::resolve`].
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub strategy: Option<String>,
    pub goal: Option<String>,
    pub target_str: Option<String>,
    pub branching_factor: Option<usize>,
    pub pruning: Option<bool>,
    pub n_streams: Option<usize>,
    pub depth: Option<usize>,
    pub width: Option<usize>,
    pub keep_last_n: Option<usize>,
    pub judge_success_score: Option<i32>,
    pub attack_max_attempts: Option<u32>,
}

impl FileConfig {
    /// Default path: `~/.redteam/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".redteam").join("config.toml"))
    }

    /// Read and parse a config file. Returns `Ok(None)` if the path is
    /// unset or the file doesn't exist; "no config" is not an error.
    pub fn load(path: Option<&PathBuf>) -> Result<Option<Self>, ConfigError> {
        let Some(path) = path.cloned().or_else(Self::default_path) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let content = expand_env_vars(&content);
        let parsed = toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
        Ok(Some(parsed))
    }

    /// Layer this file's values over `strategy`'s defaults, then validate.
    pub fn resolve(&self, strategy: Strategy) -> Result<Configuration, ConfigError> {
        let defaults = strategy.defaults();
        let cfg = Configuration {
            goal: self.goal.clone().unwrap_or(defaults.goal),
            target_str: self.target_str.clone().unwrap_or(defaults.target_str),
            branching_factor: self.branching_factor.unwrap_or(defaults.branching_factor),
            pruning: self.pruning.unwrap_or(defaults.pruning),
            n_streams: self.n_streams.unwrap_or(defaults.n_streams),
            depth: self.depth.unwrap_or(defaults.depth),
            width: self.width.unwrap_or(defaults.width),
            keep_last_n: self.keep_last_n.unwrap_or(defaults.keep_last_n),
            judge_success_score: self
                .judge_success_score
                .unwrap_or(defaults.judge_success_score),
            attack_max_attempts: self
                .attack_max_attempts
                .unwrap_or(defaults.attack_max_attempts),
        };
        Ok(cfg.validated()?)
    }

    /// Which strategy this file requests, defaulting to tree-with-pruning
    /// (the richer of the two) when unset or unrecognized.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self.strategy.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("linear-refinement") => Strategy::LinearRefinement,
            _ => Strategy::TreeWithPruning,
        }
    }
}

/// Expand `${VAR}` references against the process environment, leaving
/// unset variables as empty strings.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if ch == '$' && value[i..].starts_with("${") {
            let start = i + 2;
            if let Some(end_rel) = value[start..].find('}') {
                let end = start + end_rel;
                let var = &value[start..end];
                if !var.is_empty() {
                    out.push_str(&std::env::var(var).unwrap_or_default());
                }
                while chars.peek().is_some_and(|&(idx, _)| idx <= end) {
                    chars.next();
                }
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_map_applies_strategy_defaults_for_missing_keys() {
        let mut map = HashMap::new();
        map.insert("goal".to_string(), ConfigValue::Str("elicit secrets".into()));
        map.insert("target_str".to_string(), ConfigValue::Str("Sure, here".into()));
        let cfg = from_map(&map, Strategy::TreeWithPruning).unwrap();
        assert_eq!(cfg.branching_factor, 4);
        assert!(cfg.pruning);
    }

    #[test]
    fn from_map_ignores_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("goal".to_string(), ConfigValue::Str("g".into()));
        map.insert("target_str".to_string(), ConfigValue::Str("t".into()));
        map.insert("nonsense".to_string(), ConfigValue::Bool(true));
        assert!(from_map(&map, Strategy::LinearRefinement).is_ok());
    }

    #[test]
    fn from_map_surfaces_coercion_failure() {
        let mut map = HashMap::new();
        map.insert("goal".to_string(), ConfigValue::Str("g".into()));
        map.insert("target_str".to_string(), ConfigValue::Str("t".into()));
        map.insert("branching_factor".to_string(), ConfigValue::Str("four".into()));
        let err = from_map(&map, Strategy::LinearRefinement).unwrap_err();
        assert!(matches!(err, ConfigError::Coercion { key: "branching_factor", .. }));
    }

    #[test]
    fn from_map_overrides_depth() {
        let mut map = HashMap::new();
        map.insert("goal".to_string(), ConfigValue::Str("g".into()));
        map.insert("target_str".to_string(), ConfigValue::Str("t".into()));
        map.insert("depth".to_string(), ConfigValue::UInt(3));
        let cfg = from_map(&map, Strategy::LinearRefinement).unwrap();
        assert_eq!(cfg.depth, 3);
    }

    #[test]
    fn expand_env_vars_substitutes_known_var() {
        unsafe {
            std::env::set_var("REDTEAM_CONFIG_TEST_VAR", "hello");
        }
        assert_eq!(
            expand_env_vars("value = \"${REDTEAM_CONFIG_TEST_VAR}\""),
            "value = \"hello\""
        );
        unsafe {
            std::env::remove_var("REDTEAM_CONFIG_TEST_VAR");
        }
    }

    #[test]
    fn expand_env_vars_leaves_unset_var_empty() {
        assert_eq!(expand_env_vars("${REDTEAM_CONFIG_DEFINITELY_UNSET}"), "");
    }

    #[test]
    fn resolve_layers_file_over_strategy_defaults() {
        let file = FileConfig {
            goal: Some("elicit secrets".to_string()),
            target_str: Some("Sure, here".to_string()),
            depth: Some(5),
            ..FileConfig::default()
        };
        let cfg = file.resolve(Strategy::LinearRefinement).unwrap();
        assert_eq!(cfg.depth, 5);
        assert_eq!(cfg.branching_factor, 1); // untouched default
    }

    #[test]
    fn resolve_rejects_missing_goal() {
        let file = FileConfig {
            target_str: Some("Sure, here".to_string()),
            ..FileConfig::default()
        };
        assert!(file.resolve(Strategy::LinearRefinement).is_err());
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        let file = FileConfig {
            strategy: Some("Linear-Refinement".to_string()),
            ..FileConfig::default()
        };
        assert_eq!(file.strategy(), Strategy::LinearRefinement);
    }

    #[test]
    fn strategy_defaults_to_tree_with_pruning() {
        assert_eq!(FileConfig::default().strategy(), Strategy::TreeWithPruning);
    }
}
