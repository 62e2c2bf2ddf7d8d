use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A minutes + seconds pair as entered by the user.
///
/// Either field may be absent; an absent field counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    #[serde(default)]
    pub min: Option<u64>,
    #[serde(default)]
    pub sec: Option<u64>,
}

impl Duration {
    pub fn new(min: Option<u64>, sec: Option<u64>) -> Self {
        Self { min, sec }
    }

    pub fn from_secs(total: u64) -> Self {
        Self {
            min: Some(total / 60),
            sec: Some(total % 60),
        }
    }

    /// Total length in seconds.
    ///
    /// Uses saturating arithmetic so oversized minute values clamp to u64::MAX.
    pub fn total_secs(&self) -> u64 {
        self.min
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(self.sec.unwrap_or(0))
    }

    pub fn is_zero(&self) -> bool {
        self.total_secs() == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_secs();
        write!(f, "{}:{:02}", total / 60, total % 60)
    }
}

/// Accepts `M:SS` (e.g. `1:30`) or a plain number of seconds (e.g. `90`).
impl FromStr for Duration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDuration {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        match trimmed.split_once(':') {
            Some((min, sec)) => {
                let min = min.trim().parse::<u64>().map_err(|_| invalid())?;
                let sec = sec.trim().parse::<u64>().map_err(|_| invalid())?;
                if sec >= 60 {
                    return Err(invalid());
                }
                Ok(Self::new(Some(min), Some(sec)))
            }
            None => {
                let secs = trimmed.parse::<u64>().map_err(|_| invalid())?;
                Ok(Self::from_secs(secs))
            }
        }
    }
}
