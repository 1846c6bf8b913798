//! Multiline parser configuration
//!
//! Deserializable from any self-describing config format; also buildable in
//! code via the `with_*` methods. Validation runs at parser construction and
//! can be invoked standalone with [`MultilineConfig::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Idle bound applied when the configuration does not set one
pub const DEFAULT_MAX_IDLE_DURATION: Duration = Duration::from_secs(5);

/// Expression substituted in json mode when none is configured
pub(crate) const DEFAULT_JSON_EXPRESSION: &str = "^.*$";

/// Parsing discipline of the multiline parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A line matching the expression opens a new entry
    Newline,
    /// A line whose expression captures are non-empty continues the entry
    Continue,
    /// Lines are grouped by the key extracted by the expression; one key at a time
    Group,
    /// Like group, but entries for any number of keys accumulate concurrently
    UnorderedGroup,
    /// Relaxed JSON document reassembly
    Json,
}

impl Mode {
    /// Wire name of the mode, as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Newline => "newline",
            Mode::Continue => "continue",
            Mode::Group => "group",
            Mode::UnorderedGroup => "unordered_group",
            Mode::Json => "json",
        }
    }

    /// Whether the mode tracks several entries at the same time
    pub fn is_multitrack(&self) -> bool {
        matches!(self, Mode::UnorderedGroup)
    }

    /// Whether the mode has no natural terminator and therefore cannot
    /// operate without the idle flusher
    pub fn requires_idle_bound(&self) -> bool {
        matches!(self, Mode::Group | Mode::UnorderedGroup | Mode::Json)
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newline" => Ok(Mode::Newline),
            "continue" => Ok(Mode::Continue),
            "group" => Ok(Mode::Group),
            "unordered_group" => Ok(Mode::UnorderedGroup),
            "json" => Ok(Mode::Json),
            other => Err(ConfigError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the multiline parser
///
/// Immutable once the parser is constructed. All regexes are compiled at
/// construction and reused for every line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultilineConfig {
    /// Parsing discipline
    pub mode: Mode,

    /// Primary regular expression for the selected mode
    ///
    /// Required for every mode except `json`, where it defaults to `^.*$`.
    #[serde(default)]
    pub expression: String,

    /// Projection applied to the first line of a new entry
    ///
    /// When set, only the text covered by its capture groups opens the entry.
    #[serde(default)]
    pub first: Option<String>,

    /// Projection applied to appended lines
    ///
    /// When set, only the text covered by its capture groups is appended.
    #[serde(default)]
    pub next: Option<String>,

    /// How long an entry may wait for its next line before it is emitted
    ///
    /// Measured from the entry's first line; appends do not extend it. A zero
    /// duration disables the flusher, which `group`, `unordered_group` and
    /// `json` modes do not permit.
    #[serde(with = "humantime_serde", default = "default_max_idle")]
    pub max_idle_duration: Duration,

    /// Literal text inserted between the lines of an entry
    #[serde(default)]
    pub separator: String,
}

fn default_max_idle() -> Duration {
    DEFAULT_MAX_IDLE_DURATION
}

impl MultilineConfig {
    /// Create a configuration for the given mode with defaults elsewhere
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            expression: String::new(),
            first: None,
            next: None,
            max_idle_duration: DEFAULT_MAX_IDLE_DURATION,
            separator: String::new(),
        }
    }

    /// Set the primary expression
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    /// Set the first-line projection
    pub fn with_first(mut self, first: impl Into<String>) -> Self {
        self.first = Some(first.into());
        self
    }

    /// Set the next-line projection
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Set the separator inserted between appended lines
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the idle bound
    pub fn with_max_idle_duration(mut self, max_idle_duration: Duration) -> Self {
        self.max_idle_duration = max_idle_duration;
        self
    }

    /// Set the idle bound from a human-readable duration string ("5s", "200ms")
    pub fn with_max_idle_duration_str(mut self, s: &str) -> Result<Self, ConfigError> {
        self.max_idle_duration = humantime::parse_duration(s).map_err(ConfigError::InvalidMaxIdle)?;
        Ok(self)
    }

    /// Validate the configuration
    ///
    /// Checked again by [`MultilineParser::new`](crate::MultilineParser::new);
    /// regex compilation failures surface there.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expression.is_empty() && self.mode != Mode::Json {
            return Err(ConfigError::ExpressionRequired);
        }
        if self.max_idle_duration.is_zero() && self.mode.requires_idle_bound() {
            return Err(ConfigError::ZeroMaxIdle(self.mode));
        }
        Ok(())
    }
}
