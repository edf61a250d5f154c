//! Outbound notification interface towards the presentation layer
//!
//! The monitor loop only ever pushes values through a [`PresentationSink`];
//! the presentation layer owns every UI object and never reaches back into
//! loop state. Implementations must not block.

#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::memory::types::{MonitorEvent, PressureCallback, PressureLevel, SwapCallback};

/// Receiver of the two outbound notifications
#[cfg_attr(test, automock)]
pub trait PresentationSink: Send {
    /// The classified pressure level changed (or was observed for the first time)
    fn pressure_changed(&mut self, level: PressureLevel);

    /// Swap usage refreshed, already formatted as `"X.XX MB"`
    fn swap_updated(&mut self, display: &str);
}

impl PresentationSink for UnboundedSender<MonitorEvent> {
    fn pressure_changed(&mut self, level: PressureLevel) {
        if self.send(MonitorEvent::PressureChanged(level)).is_err() {
            debug!(%level, "event receiver dropped, pressure change discarded");
        }
    }

    fn swap_updated(&mut self, text: &str) {
        if self.send(MonitorEvent::SwapUpdated(text.to_string())).is_err() {
            debug!(display = text, "event receiver dropped, swap update discarded");
        }
    }
}

impl<T: PresentationSink + ?Sized> PresentationSink for Box<T> {
    fn pressure_changed(&mut self, level: PressureLevel) {
        (**self).pressure_changed(level)
    }

    fn swap_updated(&mut self, display: &str) {
        (**self).swap_updated(display)
    }
}

/// Sink dispatching to registered closures
#[derive(Default)]
pub struct CallbackSink {
    pressure_callbacks: Vec<PressureCallback>,
    swap_callbacks: Vec<SwapCallback>,
}

impl std::fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSink")
            .field("pressure_callbacks", &format!("<{} callbacks>", self.pressure_callbacks.len()))
            .field("swap_callbacks", &format!("<{} callbacks>", self.swap_callbacks.len()))
            .finish()
    }
}

impl CallbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure called on every pressure transition
    pub fn on_pressure_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(PressureLevel) + Send + Sync + 'static,
    {
        self.pressure_callbacks.push(Box::new(callback));
        self
    }

    /// Registers a closure called with every swap update
    pub fn on_swap_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.swap_callbacks.push(Box::new(callback));
        self
    }
}

impl PresentationSink for CallbackSink {
    fn pressure_changed(&mut self, level: PressureLevel) {
        for callback in &self.pressure_callbacks {
            callback(level);
        }
    }

    fn swap_updated(&mut self, display: &str) {
        for callback in &self.swap_callbacks {
            callback(display);
        }
    }
}
