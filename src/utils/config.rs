//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    temp_suffix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                temp_suffix: format!(".{pkg}.tmp"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Name of the optional CLI config file looked up in the current directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Suffix appended to an output file while it is being written.
    pub fn temp_suffix(&self) -> &str {
        &self.temp_suffix
    }
}

// ---- Worker threads ----

/// Thread limits for the worker pool.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Minimum worker count.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        let limits = Self::default();
        Self {
            all_threads: rayon::current_num_threads().max(limits.floor),
            ..limits
        }
    }
}

// ---- Run defaults ----

/// Defaults for [`CrackOpts`](crate::CrackOpts).
pub struct RunDefaults;

impl RunDefaults {
    /// Producer batch size. Candidate queue capacity is `BUFFER_SIZE * CHANNEL_CAP_FACTOR`.
    pub const BUFFER_SIZE: usize = 1000;
    /// Queue capacity as a multiple of the batch size, so a batch fits while workers drain the last one.
    pub const CHANNEL_CAP_FACTOR: usize = 2;
    /// Ceiling on a whole run.
    pub const TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
    /// Wait for threads to exit after a terminal condition.
    pub const GRACE_PERIOD: Duration = Duration::from_secs(1);
    /// Queue push/pop timeout; bounds how long a stop request goes unnoticed.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
    /// Minimum time between progress snapshots.
    pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
}

// ---- Trial errors ----

/// Non-password trial errors logged at warn level per worker before dropping to debug.
pub const TRIAL_ERROR_WARN_LIMIT: usize = 5;

// ---- Brute-force size checks (CLI) ----

/// Combination thresholds for brute-force runs.
pub struct CombinationThresholds;

impl CombinationThresholds {
    /// Above this, warn before starting.
    pub const WARN: u128 = 1_000_000;
    /// Above this, ask for confirmation unless quiet or --yes.
    pub const CONFIRM: u128 = 10_000_000;
}

// ---- Charset ----

/// Charset used when none is given on the command line.
pub const DEFAULT_CHARSET: &str = "MiniASCII";
