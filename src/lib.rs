//! Pressure Monitor - memory pressure sampling and classification
//!
//! This crate periodically samples the host's memory pressure level and swap
//! usage, maps the raw kernel pressure code to a small discrete state, and
//! pushes state transitions and formatted swap figures to a presentation
//! layer such as a status bar indicator.
//!
//! Rendering is not part of this crate. The presentation layer implements
//! [`memory::PresentationSink`] (or consumes a channel of
//! [`memory::MonitorEvent`]s) and may ask for an early swap refresh through
//! [`memory::MonitorHandle::request_swap_refresh`].
//!
//! # Examples
//!
//! ```no_run
//! use pressure_monitor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sink = CallbackSink::new()
//!         .on_pressure_change(|level| println!("Status: {level}"))
//!         .on_swap_update(|display| println!("Swap used: {display}"));
//!
//!     let config = MonitorConfig::with_poll_interval(std::time::Duration::from_secs(7))?;
//!     let handle = PressureMonitor::new(SystemSampler::new(), sink, config)?.spawn();
//!
//!     // e.g. when a menu is about to open
//!     handle.request_swap_refresh();
//!
//!     handle.shutdown().await
//! }
//! ```
//!
//! # Error Handling
//!
//! Kernel query failures are reported as [`SampleError::KernelQueryFailed`],
//! queries the platform cannot answer as [`SampleError::Unsupported`].
//! The monitor loop never propagates them: a failed pressure query is shown
//! as [`memory::PressureLevel::Unknown`] and a failed swap query as
//! `"0.00 MB"`, and both are logged through `tracing`.
//!
//! ```rust
//! use pressure_monitor::memory::{classify, PressureLevel};
//!
//! assert_eq!(classify(2), PressureLevel::Caution);
//! assert_eq!(classify(42), PressureLevel::Unknown);
//! ```
#![doc(html_root_url = "https://docs.rs/pressure-monitor/0.1.0")]

pub mod core;
pub mod error;
pub mod logging;
pub mod memory;

pub use error::{Error, Result, SampleError, SampleResult};
pub use logging::init_logging;

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::core::types::ByteSize;
    pub use crate::error::{Error, Result, SampleError};
    pub use crate::memory::{
        classify, format_bytes_as_gb, format_bytes_as_mb, take_sample, CallbackSink, MemorySample, MemorySampler,
        MonitorConfig, MonitorEvent, MonitorHandle, PresentationSink, PressureLevel, PressureMonitor, SwapUsage,
        SystemSampler,
    };
}
