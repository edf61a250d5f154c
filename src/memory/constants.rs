use std::time::Duration;

/// Raw pressure code reported by the kernel for normal memory pressure
pub const RAW_PRESSURE_NORMAL: i32 = 1;

/// Raw pressure code reported by the kernel for caution (warning) pressure
pub const RAW_PRESSURE_CAUTION: i32 = 2;

/// Raw pressure code reported by the kernel for severe (critical) pressure
pub const RAW_PRESSURE_SEVERE: i32 = 3;

/// Default time between two sampling ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(7);

/// Minimum accepted poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum accepted poll interval
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const BYTES_PER_KB: u64 = 1 << 10;
pub const BYTES_PER_MB: u64 = 1 << 20;
pub const BYTES_PER_GB: u64 = 1 << 30;

/// sysctl name of the kernel's memory pressure level
pub const SYSCTL_VM_PRESSURE_LEVEL: &str = "kern.memorystatus_vm_pressure_level";

/// sysctl name of the swap usage structure
pub const SYSCTL_VM_SWAPUSAGE: &str = "vm.swapusage";

/// Name reported for host VM statistics failures
pub const HOST_VM_STATISTICS: &str = "host_statistics64";

/// Linux meminfo path used for swap statistics
pub const PROC_MEMINFO: &str = "/proc/meminfo";
