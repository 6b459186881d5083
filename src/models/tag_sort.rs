use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordering rule for tag facets.
///
/// Persisted as an integer in the `settings` table under `tag_sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSort {
    /// Most used first, ties broken by case-insensitive name.
    #[default]
    Count,
    /// Case-insensitive name, counts ignored.
    Name,
}

impl TagSort {
    /// Returns the integer stored in the settings table.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Count => 0,
            Self::Name => 1,
        }
    }

    /// Returns the other ordering.
    pub fn toggled(self) -> Self {
        match self {
            Self::Count => Self::Name,
            Self::Name => Self::Count,
        }
    }
}

impl TryFrom<i64> for TagSort {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Count),
            1 => Ok(Self::Name),
            other => Err(other),
        }
    }
}

impl fmt::Display for TagSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Name => write!(f, "name"),
        }
    }
}

impl FromStr for TagSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "0" => Ok(Self::Count),
            "name" | "1" => Ok(Self::Name),
            other => Err(format!("unknown tag sort '{other}' (expected 'count' or 'name')")),
        }
    }
}
