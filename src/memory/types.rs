use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::memory::constants::{
    DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, RAW_PRESSURE_CAUTION, RAW_PRESSURE_NORMAL,
    RAW_PRESSURE_SEVERE,
};

/// Memory pressure level as reported by the host platform
///
/// Normal, Caution and Severe are ranked by severity. Unknown covers both a
/// failed kernel query and an unrecognized raw code, and is not comparable
/// with the other levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PressureLevel {
    /// Sufficient memory available
    Normal,
    /// Memory is becoming constrained
    Caution,
    /// System is under severe memory constraints
    Severe,
    /// Level could not be determined
    Unknown,
}

impl PressureLevel {
    /// Maps a raw kernel pressure code to a level. Total over all inputs.
    pub fn from_raw(code: i32) -> Self {
        match code {
            RAW_PRESSURE_NORMAL => Self::Normal,
            RAW_PRESSURE_CAUTION => Self::Caution,
            RAW_PRESSURE_SEVERE => Self::Severe,
            _ => Self::Unknown,
        }
    }

    /// Severity rank used for display ordering, `None` for Unknown
    pub fn severity(&self) -> Option<u8> {
        match self {
            Self::Normal => Some(0),
            Self::Caution => Some(1),
            Self::Severe => Some(2),
            Self::Unknown => None,
        }
    }

    /// Lowercase platform name of the level; empty for Unknown
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Caution => "caution",
            Self::Severe => "severe",
            Self::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Caution => write!(f, "Caution"),
            Self::Severe => write!(f, "Severe"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

// Unknown only compares equal to itself.
impl PartialOrd for PressureLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Swap space usage in bytes
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwapUsage {
    /// Used swap space in bytes
    pub used: u64,
    /// Total configured swap space in bytes
    pub total: u64,
}

impl SwapUsage {
    pub fn new(used: u64, total: u64) -> Self {
        Self { used, total }
    }

    /// Available swap space in bytes
    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    /// Swap utilization as a percentage (0.0-100.0)
    pub fn usage_percentage(&self) -> f64 {
        if self.total > 0 {
            (self.used as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// Immutable snapshot produced once per poll tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySample {
    pub pressure: PressureLevel,
    pub swap_used_bytes: u64,
    pub swap_total_bytes: u64,
    pub timestamp: Instant,
}

impl MemorySample {
    pub fn new(pressure: PressureLevel, swap: SwapUsage, timestamp: Instant) -> Self {
        Self {
            pressure,
            swap_used_bytes: swap.used,
            swap_total_bytes: swap.total,
            timestamp,
        }
    }

    pub fn swap(&self) -> SwapUsage {
        SwapUsage::new(self.swap_used_bytes, self.swap_total_bytes)
    }
}

/// Notification pushed from the monitor loop to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", content = "value"))]
pub enum MonitorEvent {
    /// The classified pressure level differs from the previous tick
    PressureChanged(PressureLevel),
    /// Pre-formatted swap usage, e.g. `"512.00 MB"`
    SwapUpdated(String),
}

/// Monitor loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Time between two sampling ticks
    #[cfg_attr(feature = "serde", serde(rename = "poll_interval_ms", with = "duration_ms"))]
    pub poll_interval: Duration,
}

impl MonitorConfig {
    /// Creates a configuration with a custom poll interval
    pub fn with_poll_interval(poll_interval: Duration) -> Result<Self> {
        let config = Self { poll_interval };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the poll interval lies within the accepted bounds
    pub fn validate(&self) -> Result<()> {
        if !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&self.poll_interval) {
            return Err(Error::invalid_argument(
                format!(
                    "Poll interval must be between {}ms and {}ms",
                    MIN_POLL_INTERVAL.as_millis(),
                    MAX_POLL_INTERVAL.as_millis()
                ),
                format!("{}ms", self.poll_interval.as_millis()),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL }
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Callback invoked on a pressure transition
pub type PressureCallback = Box<dyn Fn(PressureLevel) + Send + Sync>;

/// Callback invoked with the formatted swap usage
pub type SwapCallback = Box<dyn Fn(&str) + Send + Sync>;
