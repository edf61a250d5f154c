//! Raw memory statistics from the operating system
//!
//! A sampler performs read-only kernel queries and returns the raw values
//! without interpreting them. Every call is self-contained; no handle is
//! kept between calls.
//!
//! Raw bytes returned by the kernel are decoded by the `decode_*` and
//! `parse_*` functions below, which validate lengths and never touch the
//! system, so they can be tested on any platform.

use std::time::Instant;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::core::types::ByteSize;
use crate::error::{SampleError, SampleResult};
use crate::memory::classifier::classify;
use crate::memory::constants::{PROC_MEMINFO, SYSCTL_VM_PRESSURE_LEVEL, SYSCTL_VM_SWAPUSAGE};
use crate::memory::types::{MemorySample, PressureLevel, SwapUsage};

/// Source of raw memory statistics
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemorySampler: Send + Sync {
    /// Returns the raw kernel pressure code (1 normal, 2 caution, 3 severe)
    async fn sample_pressure_raw(&self) -> SampleResult<i32>;

    /// Returns used and total swap space in bytes
    async fn sample_swap_usage(&self) -> SampleResult<SwapUsage>;
}

/// Samples and classifies the pressure level, degrading any failure to Unknown
pub async fn sample_pressure<S: MemorySampler + ?Sized>(sampler: &S) -> PressureLevel {
    match sampler.sample_pressure_raw().await {
        Ok(code) => classify(code),
        Err(e) if e.is_unsupported() => {
            debug!(error = %e, "pressure level unavailable, treating level as unknown");
            PressureLevel::Unknown
        }
        Err(e) => {
            warn!(error = %e, "pressure sample failed, treating level as unknown");
            PressureLevel::Unknown
        }
    }
}

/// Samples swap usage, degrading any failure to zero usage
pub async fn sample_swap<S: MemorySampler + ?Sized>(sampler: &S) -> SwapUsage {
    match sampler.sample_swap_usage().await {
        Ok(swap) => swap,
        Err(e) if e.is_unsupported() => {
            debug!(error = %e, "swap usage unavailable, reporting zero usage");
            SwapUsage::default()
        }
        Err(e) => {
            warn!(error = %e, "swap sample failed, reporting zero usage");
            SwapUsage::default()
        }
    }
}

/// Takes a full snapshot with the same substitution policy as the monitor loop
pub async fn take_sample<S: MemorySampler + ?Sized>(sampler: &S) -> MemorySample {
    let pressure = sample_pressure(sampler).await;
    let swap = sample_swap(sampler).await;
    MemorySample::new(pressure, swap, Instant::now())
}

/// Sampler backed by the running kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSampler;

impl SystemSampler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MemorySampler for SystemSampler {
    async fn sample_pressure_raw(&self) -> SampleResult<i32> {
        platform::pressure_raw()
    }

    async fn sample_swap_usage(&self) -> SampleResult<SwapUsage> {
        platform::swap_usage().await
    }
}

/// Size of `struct xsw_usage`: three u64 fields, a u32 page size and a boolean_t
pub const XSW_USAGE_LEN: usize = 32;

/// Decodes the value of `kern.memorystatus_vm_pressure_level`
pub fn decode_pressure_level(bytes: &[u8]) -> SampleResult<i32> {
    match bytes.len() {
        4 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(bytes);
            Ok(i32::from_ne_bytes(raw))
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            i32::try_from(i64::from_ne_bytes(raw))
                .map_err(|_| SampleError::kernel(SYSCTL_VM_PRESSURE_LEVEL, "pressure level out of range"))
        }
        n => Err(SampleError::kernel(SYSCTL_VM_PRESSURE_LEVEL, format!("unexpected value length {n}"))),
    }
}

/// Decodes a `struct xsw_usage` as returned by `vm.swapusage`
///
/// Field order is `xsu_total`, `xsu_avail`, `xsu_used`.
pub fn decode_swap_usage(bytes: &[u8]) -> SampleResult<SwapUsage> {
    if bytes.len() != XSW_USAGE_LEN {
        return Err(SampleError::kernel(
            SYSCTL_VM_SWAPUSAGE,
            format!("expected {XSW_USAGE_LEN} bytes, got {}", bytes.len()),
        ));
    }

    let field = |index: usize| {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[index * 8..(index + 1) * 8]);
        u64::from_ne_bytes(raw)
    };

    let total = field(0);
    let used = field(2);
    Ok(SwapUsage::new(used, total))
}

/// Extracts swap usage from the contents of `/proc/meminfo`
pub fn parse_meminfo_swap(contents: &str) -> SampleResult<SwapUsage> {
    let mut total_kb = None;
    let mut free_kb = None;

    for line in contents.lines() {
        let mut parts = line.split_whitespace();
        let slot = match parts.next() {
            Some("SwapTotal:") => &mut total_kb,
            Some("SwapFree:") => &mut free_kb,
            _ => continue,
        };
        let value = parts
            .next()
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| SampleError::kernel(PROC_MEMINFO, format!("malformed line `{line}`")))?;
        *slot = Some(value);
    }

    match (total_kb, free_kb) {
        (Some(total), Some(free)) => {
            let total = ByteSize::from_kb(total).as_bytes();
            let free = ByteSize::from_kb(free).as_bytes();
            Ok(SwapUsage::new(total.saturating_sub(free), total))
        }
        _ => Err(SampleError::kernel(PROC_MEMINFO, "SwapTotal or SwapFree missing")),
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::ffi::CString;

    use super::{decode_pressure_level, decode_swap_usage, XSW_USAGE_LEN};
    use crate::error::{SampleError, SampleResult};
    use crate::memory::constants::{HOST_VM_STATISTICS, SYSCTL_VM_PRESSURE_LEVEL, SYSCTL_VM_SWAPUSAGE};
    use crate::memory::types::SwapUsage;

    const KERN_SUCCESS: i32 = 0;
    const HOST_VM_INFO64: i32 = 4;
    const HOST_VM_INFO64_COUNT: u32 = 38;

    type MachPortT = u32;

    extern "C" {
        fn mach_host_self() -> MachPortT;

        fn mach_task_self() -> MachPortT;

        fn mach_port_deallocate(task: MachPortT, name: MachPortT) -> i32;

        fn host_statistics64(host_priv: MachPortT, flavor: i32, host_info_out: *mut i32, host_info_out_cnt: *mut u32)
            -> i32;
    }

    fn check_host_statistics() -> SampleResult<()> {
        // Only the return code is used; the buffer has the size of vm_statistics64.
        let mut info = [0u32; HOST_VM_INFO64_COUNT as usize];
        let mut count = HOST_VM_INFO64_COUNT;

        // mach_host_self hands out a new send right on every call
        let host = unsafe { mach_host_self() };
        let kern_result = unsafe { host_statistics64(host, HOST_VM_INFO64, info.as_mut_ptr().cast(), &mut count) };
        unsafe { mach_port_deallocate(mach_task_self(), host) };

        if kern_result != KERN_SUCCESS {
            return Err(SampleError::kernel(HOST_VM_STATISTICS, format!("kern_return_t {kern_result}")));
        }
        Ok(())
    }

    fn read_sysctl(name: &'static str, buf: &mut [u8]) -> SampleResult<usize> {
        let c_name = CString::new(name).map_err(|e| SampleError::kernel(name, e.to_string()))?;
        let mut len: libc::size_t = buf.len();

        let result = unsafe {
            libc::sysctlbyname(c_name.as_ptr(), buf.as_mut_ptr().cast(), &mut len, std::ptr::null_mut(), 0)
        };

        if result != 0 {
            return Err(SampleError::kernel(
                name,
                format!("sysctlbyname returned {result}: {}", std::io::Error::last_os_error()),
            ));
        }
        Ok(len.min(buf.len()))
    }

    pub(super) fn pressure_raw() -> SampleResult<i32> {
        check_host_statistics()?;

        let mut buf = [0u8; 8];
        let len = read_sysctl(SYSCTL_VM_PRESSURE_LEVEL, &mut buf)?;
        decode_pressure_level(&buf[..len])
    }

    pub(super) async fn swap_usage() -> SampleResult<SwapUsage> {
        let mut buf = [0u8; XSW_USAGE_LEN];
        let len = read_sysctl(SYSCTL_VM_SWAPUSAGE, &mut buf)?;
        decode_swap_usage(&buf[..len])
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::parse_meminfo_swap;
    use crate::error::{SampleError, SampleResult};
    use crate::memory::constants::{PROC_MEMINFO, SYSCTL_VM_PRESSURE_LEVEL};
    use crate::memory::types::SwapUsage;

    pub(super) fn pressure_raw() -> SampleResult<i32> {
        Err(SampleError::unsupported(SYSCTL_VM_PRESSURE_LEVEL))
    }

    pub(super) async fn swap_usage() -> SampleResult<SwapUsage> {
        let contents = tokio::fs::read_to_string(PROC_MEMINFO)
            .await
            .map_err(|e| SampleError::kernel(PROC_MEMINFO, e.to_string()))?;
        parse_meminfo_swap(&contents)
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
mod platform {
    use crate::error::{SampleError, SampleResult};
    use crate::memory::constants::{SYSCTL_VM_PRESSURE_LEVEL, SYSCTL_VM_SWAPUSAGE};
    use crate::memory::types::SwapUsage;

    pub(super) fn pressure_raw() -> SampleResult<i32> {
        Err(SampleError::unsupported(SYSCTL_VM_PRESSURE_LEVEL))
    }

    pub(super) async fn swap_usage() -> SampleResult<SwapUsage> {
        Err(SampleError::unsupported(SYSCTL_VM_SWAPUSAGE))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;

    fn xsw_bytes(total: u64, avail: u64, used: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(XSW_USAGE_LEN);
        bytes.extend_from_slice(&total.to_ne_bytes());
        bytes.extend_from_slice(&avail.to_ne_bytes());
        bytes.extend_from_slice(&used.to_ne_bytes());
        bytes.extend_from_slice(&4096u32.to_ne_bytes());
        bytes.extend_from_slice(&1u32.to_ne_bytes());
        bytes
    }

    #[test]
    fn test_decode_pressure_level() {
        assert_eq!(decode_pressure_level(&2i32.to_ne_bytes()), Ok(2));
        assert_eq!(decode_pressure_level(&4i64.to_ne_bytes()), Ok(4));
    }

    #[test]
    fn test_decode_pressure_level_rejects_bad_lengths() {
        for len in [0, 1, 3, 5, 16] {
            let err = decode_pressure_level(&vec![0u8; len]).unwrap_err();
            assert_eq!(err.query(), SYSCTL_VM_PRESSURE_LEVEL);
        }
        assert!(decode_pressure_level(&i64::MAX.to_ne_bytes()).is_err());
    }

    #[test]
    fn test_decode_swap_usage_field_order() {
        let gb = 1024 * 1024 * 1024;
        let swap = decode_swap_usage(&xsw_bytes(4 * gb, 3 * gb, gb)).unwrap();
        assert_eq!(swap, SwapUsage::new(gb, 4 * gb));
    }

    #[test]
    fn test_decode_swap_usage_rejects_truncated_buffer() {
        let bytes = xsw_bytes(1, 1, 0);
        let err = decode_swap_usage(&bytes[..24]).unwrap_err();
        assert_eq!(err.query(), SYSCTL_VM_SWAPUSAGE);
    }

    #[test]
    fn test_parse_meminfo_swap() {
        let contents = "MemTotal:       16303428 kB\n\
                        MemFree:         1062116 kB\n\
                        SwapCached:        12345 kB\n\
                        SwapTotal:       2097148 kB\n\
                        SwapFree:        1048572 kB\n";
        let swap = parse_meminfo_swap(contents).unwrap();
        assert_eq!(swap.total, 2_097_148 * 1024);
        assert_eq!(swap.used, 1_048_576 * 1024);
    }

    #[test]
    fn test_parse_meminfo_without_swap() {
        let contents = "MemTotal: 1024 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n";
        assert_eq!(parse_meminfo_swap(contents), Ok(SwapUsage::default()));
    }

    #[test]
    fn test_parse_meminfo_errors() {
        assert!(parse_meminfo_swap("MemTotal: 1024 kB\n").is_err());
        assert!(parse_meminfo_swap("SwapTotal: lots kB\nSwapFree: 0 kB\n").is_err());
    }

    #[tokio::test]
    async fn test_take_sample_substitutes_defaults_on_failure() {
        let mut sampler = MockMemorySampler::new();
        sampler
            .expect_sample_pressure_raw()
            .times(1)
            .returning(|| Err(SampleError::kernel(SYSCTL_VM_PRESSURE_LEVEL, "boom")));
        sampler
            .expect_sample_swap_usage()
            .times(1)
            .returning(|| Err(SampleError::kernel(SYSCTL_VM_SWAPUSAGE, "boom")));

        let sample = take_sample(&sampler).await;
        assert_eq!(sample.pressure, PressureLevel::Unknown);
        assert_eq!(sample.swap(), SwapUsage::default());
    }

    #[tokio::test]
    async fn test_take_sample_classifies_raw_code() {
        let mut sampler = MockMemorySampler::new();
        sampler.expect_sample_pressure_raw().returning(|| Ok(3));
        sampler.expect_sample_swap_usage().returning(|| Ok(SwapUsage::new(10, 20)));

        let sample = take_sample(&sampler).await;
        assert_eq!(sample.pressure, PressureLevel::Severe);
        assert_eq!(sample.swap_used_bytes, 10);
        assert_eq!(sample.swap_total_bytes, 20);
    }

    /// Counts WARN events seen by the thread-local subscriber
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_unsupported_query_degrades_without_warning() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(WarnCounter(warnings.clone())));

        let mut unsupported = MockMemorySampler::new();
        unsupported
            .expect_sample_pressure_raw()
            .returning(|| Err(SampleError::unsupported(SYSCTL_VM_PRESSURE_LEVEL)));
        unsupported
            .expect_sample_swap_usage()
            .returning(|| Err(SampleError::unsupported(SYSCTL_VM_SWAPUSAGE)));

        for _ in 0..3 {
            assert_eq!(sample_pressure(&unsupported).await, PressureLevel::Unknown);
            assert_eq!(sample_swap(&unsupported).await, SwapUsage::default());
        }
        assert_eq!(warnings.load(Ordering::SeqCst), 0);

        let mut failing = MockMemorySampler::new();
        failing
            .expect_sample_pressure_raw()
            .returning(|| Err(SampleError::kernel(SYSCTL_VM_PRESSURE_LEVEL, "sysctlbyname returned -1")));
        assert_eq!(sample_pressure(&failing).await, PressureLevel::Unknown);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[cfg(target_os = "macos")]
    #[tokio::test]
    async fn test_macos_pressure_query_repeats_without_exhausting_ports() {
        let sampler = SystemSampler::new();
        for _ in 0..10_000 {
            let code = sampler.sample_pressure_raw().await.unwrap();
            assert!((1..=4).contains(&code), "code {code}");
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_linux_pressure_query_is_unsupported() {
        let err = SystemSampler::new().sample_pressure_raw().await.unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.query(), SYSCTL_VM_PRESSURE_LEVEL);
    }

    #[tokio::test]
    async fn test_system_sampler_never_panics() {
        let sampler = SystemSampler::new();
        for _ in 0..3 {
            let sample = take_sample(&sampler).await;
            assert!(sample.swap_used_bytes <= sample.swap_total_bytes || sample.swap_total_bytes == 0);
        }
    }
}
