//! Memory pressure sampling and classification
//!
//! This module samples the host's memory pressure level and swap usage,
//! classifies the raw pressure code and drives a periodic loop that pushes
//! changes to a presentation layer.
//!
//! # Components
//!
//! - [`MemorySampler`] reads raw statistics from the kernel ([`SystemSampler`])
//! - [`classifier`] maps raw codes to a [`PressureLevel`] and formats byte counts
//! - [`PressureMonitor`] owns the timing and transition detection
//! - [`PresentationSink`] receives the outbound notifications
//!
//! # Examples
//!
//! Running the loop and consuming events from a channel:
//!
//! ```no_run
//! use pressure_monitor::memory::{MonitorEvent, PressureMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let handle = PressureMonitor::with_system_sampler(tx).spawn();
//!
//!     while let Some(event) = rx.recv().await {
//!         match event {
//!             MonitorEvent::PressureChanged(level) => println!("Status: {level}"),
//!             MonitorEvent::SwapUpdated(display) => println!("Swap: {display}"),
//!         }
//!     }
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! Taking a single snapshot:
//!
//! ```no_run
//! use pressure_monitor::memory::{take_sample, SystemSampler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sample = take_sample(&SystemSampler::new()).await;
//!     println!("{} / {} bytes of swap used", sample.swap_used_bytes, sample.swap_total_bytes);
//! }
//! ```

/// Memory monitoring constants
pub mod constants;

/// Raw code classification and byte formatting
pub mod classifier;

pub mod monitor;

pub mod sampler;

pub mod sink;

/// Memory data types
pub mod types;

pub use classifier::{classify, format_bytes_as_gb, format_bytes_as_mb};
pub use monitor::{MonitorHandle, MonitorState, PressureMonitor};
pub use sampler::{take_sample, MemorySampler, SystemSampler};
pub use sink::{CallbackSink, PresentationSink};
pub use types::*;
