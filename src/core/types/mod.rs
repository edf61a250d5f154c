//! # Core Types Module
//!
//! Fundamental value types shared by the sampling and classification code.
//!
//! ## Example
//!
//! ```rust
//! use pressure_monitor::core::types::ByteSize;
//!
//! let size = ByteSize::new(1_572_864);
//! assert_eq!(size.as_mb(), 1.5);
//! assert_eq!(size.format_mb(), "1.50 MB");
//! ```

use crate::memory::constants::{BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB};

/// Represents a size in bytes with convenient conversion methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Creates a new ByteSize instance from the given number of bytes
    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Creates a ByteSize from a count of kibibytes, saturating on overflow
    pub fn from_kb(kb: u64) -> Self {
        Self(kb.saturating_mul(BYTES_PER_KB))
    }

    /// Returns the size in bytes
    pub fn as_bytes(&self) -> u64 {
        self.0
    }

    /// Returns the size in mebibytes (bytes / 2^20)
    pub fn as_mb(&self) -> f64 {
        self.0 as f64 / BYTES_PER_MB as f64
    }

    /// Returns the size in gibibytes (bytes / 2^30)
    pub fn as_gb(&self) -> f64 {
        self.0 as f64 / BYTES_PER_GB as f64
    }

    /// Formats the size as `"X.XX MB"`
    pub fn format_mb(&self) -> String {
        format!("{} MB", self.format_in(BYTES_PER_MB))
    }

    /// Formats the size as `"X.XX GB"`
    pub fn format_gb(&self) -> String {
        format!("{} GB", self.format_in(BYTES_PER_GB))
    }

    // Rounds half up to hundredths of `unit` in integer arithmetic, exact for every u64.
    fn format_in(&self, unit: u64) -> String {
        let unit = u128::from(unit);
        let hundredths = (u128::from(self.0) * 100 + unit / 2) / unit;
        format!("{}.{:02}", hundredths / 100, hundredths % 100)
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl From<ByteSize> for u64 {
    fn from(size: ByteSize) -> Self {
        size.as_bytes()
    }
}

impl std::ops::Sub for ByteSize {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}
