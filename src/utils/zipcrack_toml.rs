//! Load `.zipcrack.toml` from a directory (CLI only). Lib callers pass [`CrackOpts`](crate::CrackOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::cli::RunSettings;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ZipcrackToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    threads: Option<usize>,
    buffer: Option<usize>,
    /// Seconds.
    timeout: Option<u64>,
    extract_path: Option<String>,
    charset: Option<String>,
    quiet: Option<bool>,
    verbose: Option<bool>,
    progress_interval_ms: Option<u64>,
}

/// Load the config file from `dir` if present. `Ok(None)` when missing or unreadable;
/// `Err` carries a message for a file that exists but does not parse (logged by the caller once logging is up).
pub(crate) fn load_zipcrack_toml(dir: &Path) -> Result<Option<ZipcrackToml>, String> {
    let path = dir.join(PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    parse_zipcrack_toml(&s)
        .map(Some)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

pub(crate) fn parse_zipcrack_toml(s: &str) -> Result<ZipcrackToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $target:expr, $sec_field:ident => $target_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $target.$target_field = v;
        }
    };
}

/// Apply file config to settings (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_settings(file: &ZipcrackToml, settings: &mut RunSettings) {
    let sec = &file.settings;
    if let Some(n) = sec.threads {
        settings.opts.threads = Some(n);
    }
    if let Some(n) = sec.buffer {
        settings.opts.buffer_size = n;
    }
    if let Some(secs) = sec.timeout {
        settings.opts.timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = sec.progress_interval_ms {
        settings.opts.progress_interval = Duration::from_millis(ms);
    }
    if let Some(ref p) = sec.extract_path {
        settings.extract_path = PathBuf::from(p);
    }
    apply_file_opt!(sec, settings, charset => charset);
    apply_file_opt!(sec, settings, quiet => quiet);
    apply_file_opt!(sec, settings, verbose => verbose);
}
