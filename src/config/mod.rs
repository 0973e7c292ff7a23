//! Settings consumed by analysis and rendering.
//!
//! The core never touches the settings file directly. It resolves a typed
//! [`Settings`] from anything implementing [`ConfigLookup`], substituting the
//! default for every missing or malformed value.

pub mod store;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::warn;

use crate::error::ConfigError;

pub use store::{CONFIG_FILE_NAME, ConfigStore, config_path};

pub const KEY_COMMIT_STYLE: &str = "commit_style";
pub const KEY_EMOJI: &str = "emoji";
pub const KEY_MAX_SUBJECT_LENGTH: &str = "max_subject_length";
pub const KEY_INCLUDE_UNSTAGED_PROMPT: &str = "include_unstaged_prompt";
pub const KEY_FIX_REMOVAL_MARGIN: &str = "fix_removal_margin";

pub const DEFAULT_COMMIT_STYLE: CommitStyle = CommitStyle::Detailed;
pub const DEFAULT_EMOJI: bool = false;
pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 72;
pub const DEFAULT_INCLUDE_UNSTAGED_PROMPT: bool = true;
pub const DEFAULT_FIX_REMOVAL_MARGIN: usize = 0;

/// Key/value source the settings are resolved from.
pub trait ConfigLookup {
    /// Raw stored value for `key`, or `None` when the key is absent.
    fn get(&self, key: &str) -> Option<Value>;
}

impl ConfigLookup for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigLookup for serde_json::Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        serde_json::Map::get(self, key).cloned()
    }
}

/// Two lookups stacked: `overrides` wins, `base` fills the rest.
///
/// Used by the CLI to apply command-line flags on top of the stored settings.
pub struct Layered<'a> {
    pub overrides: &'a dyn ConfigLookup,
    pub base: &'a dyn ConfigLookup,
}

impl ConfigLookup for Layered<'_> {
    fn get(&self, key: &str) -> Option<Value> {
        self.overrides.get(key).or_else(|| self.base.get(key))
    }
}

/// Message format selected by `commit_style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStyle {
    Simple,
    Detailed,
    Conventional,
}

impl CommitStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
            Self::Conventional => "conventional",
        }
    }
}

impl fmt::Display for CommitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            "conventional" => Ok(Self::Conventional),
            _ => Err(format!("Unknown commit style: {}", s)),
        }
    }
}

/// Resolved settings with every value present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub commit_style: CommitStyle,
    pub emoji: bool,
    pub max_subject_length: usize,
    pub include_unstaged_prompt: bool,
    /// Extra deletions (beyond additions) a modification needs before it is
    /// classified as a fix.
    pub fix_removal_margin: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commit_style: DEFAULT_COMMIT_STYLE,
            emoji: DEFAULT_EMOJI,
            max_subject_length: DEFAULT_MAX_SUBJECT_LENGTH,
            include_unstaged_prompt: DEFAULT_INCLUDE_UNSTAGED_PROMPT,
            fix_removal_margin: DEFAULT_FIX_REMOVAL_MARGIN,
        }
    }
}

impl Settings {
    /// Resolve settings from a lookup.
    ///
    /// Missing keys take their default. Malformed values are logged and
    /// replaced by the default; this never fails.
    pub fn from_lookup<L: ConfigLookup + ?Sized>(lookup: &L) -> Self {
        let defaults = Self::default();

        Self {
            commit_style: resolve(lookup, KEY_COMMIT_STYLE, defaults.commit_style, parse_style),
            emoji: resolve(lookup, KEY_EMOJI, defaults.emoji, parse_bool),
            max_subject_length: resolve(
                lookup,
                KEY_MAX_SUBJECT_LENGTH,
                defaults.max_subject_length,
                parse_positive,
            ),
            include_unstaged_prompt: resolve(
                lookup,
                KEY_INCLUDE_UNSTAGED_PROMPT,
                defaults.include_unstaged_prompt,
                parse_bool,
            ),
            fix_removal_margin: resolve(
                lookup,
                KEY_FIX_REMOVAL_MARGIN,
                defaults.fix_removal_margin,
                parse_non_negative,
            ),
        }
    }
}

/// The stored defaults, as written by `ConfigStore::init`.
pub fn default_values() -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    map.insert(KEY_COMMIT_STYLE.into(), Value::from(DEFAULT_COMMIT_STYLE.as_str()));
    map.insert(KEY_EMOJI.into(), Value::from(DEFAULT_EMOJI));
    map.insert(KEY_MAX_SUBJECT_LENGTH.into(), Value::from(DEFAULT_MAX_SUBJECT_LENGTH));
    map.insert(
        KEY_INCLUDE_UNSTAGED_PROMPT.into(),
        Value::from(DEFAULT_INCLUDE_UNSTAGED_PROMPT),
    );
    map.insert(KEY_FIX_REMOVAL_MARGIN.into(), Value::from(DEFAULT_FIX_REMOVAL_MARGIN));
    map
}

fn resolve<T, L>(
    lookup: &L,
    key: &str,
    default: T,
    parse: fn(&str, &Value) -> Result<T, ConfigError>,
) -> T
where
    L: ConfigLookup + ?Sized,
{
    let Some(value) = lookup.get(key) else {
        return default;
    };
    if value.is_null() {
        return default;
    }

    match parse(key, &value) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("{e}; using default");
            default
        }
    }
}

fn invalid(key: &str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Unknown style names fall back to simple; non-string values are invalid.
fn parse_style(key: &str, value: &Value) -> Result<CommitStyle, ConfigError> {
    let name = value.as_str().ok_or_else(|| invalid(key, value))?;
    Ok(name.parse::<CommitStyle>().unwrap_or_else(|e| {
        warn!("{e}; falling back to simple");
        CommitStyle::Simple
    }))
}

fn parse_bool(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid(key, value)),
        },
        _ => Err(invalid(key, value)),
    }
}

fn parse_non_negative(key: &str, value: &Value) -> Result<usize, ConfigError> {
    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    number
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(key, value))
}

fn parse_positive(key: &str, value: &Value) -> Result<usize, ConfigError> {
    match parse_non_negative(key, value)? {
        0 => Err(invalid(key, value)),
        n => Ok(n),
    }
}
