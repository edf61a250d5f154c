#![allow(dead_code)]

pub mod builders;

use pressure_monitor::memory::{MonitorEvent, PressureLevel};
use tokio::sync::mpsc::UnboundedReceiver;

pub use builders::sampler::{ScriptedSampler, TestSamplerBuilder};

/// Collects every event currently queued on the receiver
pub fn drain(rx: &mut UnboundedReceiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn pressure_levels(events: &[MonitorEvent]) -> Vec<PressureLevel> {
    events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::PressureChanged(level) => Some(*level),
            MonitorEvent::SwapUpdated(_) => None,
        })
        .collect()
}

pub fn swap_displays(events: &[MonitorEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::SwapUpdated(display) => Some(display.clone()),
            MonitorEvent::PressureChanged(_) => None,
        })
        .collect()
}
