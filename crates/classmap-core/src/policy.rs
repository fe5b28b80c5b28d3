//! Extraction policies shared by the parser and its callers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// What extraction does with a parameter default that is neither a signed
/// integer nor a string literal (`1.5`, `'c'`, `true`, `null`, ...).
///
/// # Variants
///
/// - `Drop` - Keep the parameter, discard its default and log a warning (default)
/// - `Reject` - Fail the whole unit
/// - `Keep` - Keep the default as raw source text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValuePolicy {
    #[default]
    Drop,
    Reject,
    Keep,
}

impl FromStr for DefaultValuePolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(Self::Drop),
            "reject" => Ok(Self::Reject),
            "keep" => Ok(Self::Keep),
            _ => Err("Unsupported default value policy"),
        }
    }
}

impl From<DefaultValuePolicy> for &'static str {
    fn from(val: DefaultValuePolicy) -> Self {
        match val {
            DefaultValuePolicy::Drop => "drop",
            DefaultValuePolicy::Reject => "reject",
            DefaultValuePolicy::Keep => "keep",
        }
    }
}

impl fmt::Display for DefaultValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}
