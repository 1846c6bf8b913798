//! Multiline configuration errors
//!
//! Construction-time failures. The `Display` strings are stable identifiers
//! relied upon by configuration tooling and tests; the underlying cause (a
//! regex or duration parse error) travels as the error's `source`.

use thiserror::Error;

use crate::config::Mode;

/// Errors raised while building a [`MultilineParser`](crate::MultilineParser)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration section was provided
    #[error("empty configuration")]
    Empty,

    /// The primary expression did not compile
    #[error("could not compile expression")]
    Expression(#[source] regex::Error),

    /// The first-line expression did not compile
    #[error("could not compile first_expression")]
    First(#[source] regex::Error),

    /// The next-line expression did not compile
    #[error("could not compile next_expression")]
    Next(#[source] regex::Error),

    /// The mode needs a primary expression and none was given
    #[error("expression is required")]
    ExpressionRequired,

    /// The mode name is not one of the supported modes
    #[error("unsupported mode")]
    UnsupportedMode(String),

    /// The idle duration string did not parse
    #[error("invalid max_idle_duration duration")]
    InvalidMaxIdle(#[source] humantime::DurationError),

    /// The selected mode cannot operate without an idle bound
    #[error("mode require max_idle_duration duration > 0")]
    ZeroMaxIdle(Mode),
}
