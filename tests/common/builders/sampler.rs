use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pressure_monitor::memory::{MemorySampler, SwapUsage};
use pressure_monitor::{SampleError, SampleResult};

/// One scripted answer; `None` makes the query fail
type Script<T> = VecDeque<Option<T>>;

/// Sampler replaying scripted kernel answers
///
/// Once a script runs out, the last answer repeats.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    pressure: Arc<Mutex<Script<i32>>>,
    swap: Arc<Mutex<Script<SwapUsage>>>,
    pressure_calls: Arc<AtomicUsize>,
    swap_calls: Arc<AtomicUsize>,
}

impl ScriptedSampler {
    pub fn pressure_calls(&self) -> usize {
        self.pressure_calls.load(Ordering::SeqCst)
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    fn next<T: Copy>(script: &Mutex<Script<T>>) -> Option<T> {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().flatten()
        } else {
            script.front().copied().flatten()
        }
    }
}

#[async_trait]
impl MemorySampler for ScriptedSampler {
    async fn sample_pressure_raw(&self) -> SampleResult<i32> {
        self.pressure_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.pressure).ok_or_else(|| SampleError::KernelQueryFailed {
            query: "kern.memorystatus_vm_pressure_level",
            reason: "scripted failure".to_string(),
        })
    }

    async fn sample_swap_usage(&self) -> SampleResult<SwapUsage> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.swap).ok_or_else(|| SampleError::KernelQueryFailed {
            query: "vm.swapusage",
            reason: "scripted failure".to_string(),
        })
    }
}

/// Builder for creating scripted samplers
#[derive(Debug, Default)]
pub struct TestSamplerBuilder {
    pressure: Script<i32>,
    swap: Script<SwapUsage>,
}

impl TestSamplerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw pressure codes answered in order
    pub fn with_pressure_codes(mut self, codes: &[i32]) -> Self {
        self.pressure.extend(codes.iter().copied().map(Some));
        self
    }

    /// Append one failing pressure query
    pub fn with_pressure_failure(mut self) -> Self {
        self.pressure.push_back(None);
        self
    }

    /// Append one swap answer
    pub fn with_swap(mut self, used: u64, total: u64) -> Self {
        self.swap.push_back(Some(SwapUsage::new(used, total)));
        self
    }

    /// Append one failing swap query
    pub fn with_swap_failure(mut self) -> Self {
        self.swap.push_back(None);
        self
    }

    pub fn build(self) -> ScriptedSampler {
        let swap = if self.swap.is_empty() { VecDeque::from([Some(SwapUsage::default())]) } else { self.swap };
        ScriptedSampler {
            pressure: Arc::new(Mutex::new(self.pressure)),
            swap: Arc::new(Mutex::new(swap)),
            pressure_calls: Arc::new(AtomicUsize::new(0)),
            swap_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}
