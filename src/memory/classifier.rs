//! Pure mapping from raw kernel values to display values
//!
//! Samplers return raw codes only; interpreting them happens here.

use crate::core::types::ByteSize;
use crate::memory::types::PressureLevel;

/// Classifies a raw pressure code: 1 is Normal, 2 is Caution, 3 is Severe,
/// anything else is Unknown.
pub fn classify(raw_code: i32) -> PressureLevel {
    PressureLevel::from_raw(raw_code)
}

/// Formats a byte count as gibibytes with two decimals, e.g. `"1.00 GB"`
pub fn format_bytes_as_gb(bytes: u64) -> String {
    ByteSize::new(bytes).format_gb()
}

/// Formats a byte count as mebibytes with two decimals, e.g. `"1.50 MB"`
pub fn format_bytes_as_mb(bytes: u64) -> String {
    ByteSize::new(bytes).format_mb()
}
