//! Periodicity of a return series and its annualization factor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// Periodicity of the `returns` data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Period {
    /// One observation per year
    #[serde(rename = "y")]
    Yearly,
    /// One observation per quarter
    #[serde(rename = "q")]
    Quarterly,
    /// One observation per month
    #[serde(rename = "m")]
    Monthly,
    /// One observation per week
    #[serde(rename = "w")]
    Weekly,
    /// One observation per trading day
    #[default]
    #[serde(rename = "d")]
    Daily,
}

impl Period {
    /// All periods, longest first
    pub const ALL: [Period; 5] = [
        Period::Yearly,
        Period::Quarterly,
        Period::Monthly,
        Period::Weekly,
        Period::Daily,
    ];

    /// Number of periods per year
    pub fn annualization_factor(&self) -> u32 {
        match self {
            Period::Yearly => 1,
            Period::Quarterly => 4,
            Period::Monthly => 12,
            Period::Weekly => 52,
            Period::Daily => 252,
        }
    }

    /// Short label used on the command line
    pub fn label(&self) -> &'static str {
        match self {
            Period::Yearly => "y",
            Period::Quarterly => "q",
            Period::Monthly => "m",
            Period::Weekly => "w",
            Period::Daily => "d",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Period {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "year" => Ok(Period::Yearly),
            "q" | "quarter" => Ok(Period::Quarterly),
            "m" | "month" => Ok(Period::Monthly),
            "w" | "week" => Ok(Period::Weekly),
            "d" | "day" => Ok(Period::Daily),
            _ => Err(StatsError::UnknownPeriod(s.to_string())),
        }
    }
}
