// Vulnerability levels and the level filter vocabulary.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// Ordinal vulnerability classification, 1 (lowest risk) to 5 (highest).
///
/// Source data may omit the level or carry a malformed value; both
/// normalize to [`Level::Unknown`], which renders in the neutral color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
pub enum Level {
    #[strum(serialize = "1")]
    L1,
    #[strum(serialize = "2")]
    L2,
    #[strum(serialize = "3")]
    L3,
    #[strum(serialize = "4")]
    L4,
    #[strum(serialize = "5")]
    L5,
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl Level {
    /// All known (non-Unknown) levels, lowest risk first.
    pub const KNOWN: [Self; 5] = [Self::L1, Self::L2, Self::L3, Self::L4, Self::L5];

    /// Interpret a raw property value as a level.
    ///
    /// Accepts integers, integral floats, and numeric strings (trimmed).
    /// Everything else is `Unknown` — the caller decides whether that is
    /// worth a log line.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .map_or(Self::Unknown, Self::from_ordinal),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_or(Self::Unknown, Self::from_ordinal),
            _ => Self::Unknown,
        }
    }

    fn from_ordinal(n: i64) -> Self {
        match n {
            1 => Self::L1,
            2 => Self::L2,
            3 => Self::L3,
            4 => Self::L4,
            5 => Self::L5,
            _ => Self::Unknown,
        }
    }
}

/// The active level filter: show everything, or mute features whose
/// level differs from the chosen one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(Level),
}

impl LevelFilter {
    /// Whether a feature with `level` passes this filter.
    pub fn matches(self, level: Level) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => level == wanted,
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(level) => write!(f, "{level}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid filter value: {0}")]
pub struct ParseFilterError(String);

impl FromStr for LevelFilter {
    type Err = ParseFilterError;

    /// Parse the panel control vocabulary: `"all"` or `"1"`..`"5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match Level::from_str(s) {
            Ok(level) if level != Level::Unknown => Ok(Self::Only(level)),
            _ => Err(ParseFilterError(s.to_owned())),
        }
    }
}
