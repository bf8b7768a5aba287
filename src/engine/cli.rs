//! CLI command dispatch: merge config file and flags into run settings, then hand off to the handlers.

use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::CrackOpts;
use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::engine::handlers::{
    handle_bruteforce, handle_estimate, handle_generate, handle_wordlist,
};
use crate::utils::config::DEFAULT_CHARSET;
use crate::utils::setup_logging;
use crate::utils::zipcrack_toml::{apply_file_to_settings, load_zipcrack_toml};

/// Everything a CLI run needs: library options plus CLI-only switches.
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub opts: CrackOpts,
    pub extract_path: PathBuf,
    pub charset: String,
    pub quiet: bool,
    pub verbose: bool,
    pub json: bool,
    pub assume_yes: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            opts: CrackOpts::default(),
            extract_path: PathBuf::from("."),
            charset: DEFAULT_CHARSET.to_string(),
            quiet: false,
            verbose: false,
            json: false,
            assume_yes: false,
        }
    }
}

impl RunSettings {
    /// No prompts or progress bar: quiet or machine-readable output.
    pub fn interactive(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Apply CLI flags over settings (flags win over the config file).
fn apply_cli_to_settings(common: &CommonArgs, settings: &mut RunSettings) {
    if let Some(ref p) = common.extract_path {
        settings.extract_path = p.clone();
    }
    if let Some(n) = common.threads {
        settings.opts.threads = Some(n);
    }
    if let Some(n) = common.buffer {
        settings.opts.buffer_size = n;
    }
    if let Some(secs) = common.timeout {
        settings.opts.timeout = Duration::from_secs(secs);
    }
    if let Some(q) = common.quiet {
        settings.quiet = q;
    }
    if let Some(v) = common.verbose {
        settings.verbose = v;
    }
    settings.json = common.json;
    settings.assume_yes = common.yes;
}

/// Defaults → `.zipcrack.toml` in the current directory → CLI flags. Sets up logging last so the
/// file can change the level.
fn setup_settings(
    common: Option<&CommonArgs>,
    charset: Option<&str>,
    verbose: Option<bool>,
) -> RunSettings {
    let mut settings = RunSettings::default();
    let file_warning = match load_zipcrack_toml(std::path::Path::new(".")) {
        Ok(Some(file)) => {
            apply_file_to_settings(&file, &mut settings);
            None
        }
        Ok(None) => None,
        Err(msg) => Some(msg),
    };
    if let Some(common) = common {
        apply_cli_to_settings(common, &mut settings);
    }
    if let Some(c) = charset {
        settings.charset = c.to_string();
    }
    if let Some(v) = verbose {
        settings.verbose = v;
    }

    setup_logging(settings.verbose, settings.quiet || settings.json);
    if let Some(msg) = file_warning {
        warn!("ignoring config file {}", msg);
    }
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        settings
    );
    settings
}

/// Run the selected subcommand. Returns the process exit code.
pub fn handle_run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Wordlist {
            archive,
            wordlist,
            common,
        } => {
            let settings = setup_settings(Some(common), None, None);
            handle_wordlist(archive, wordlist, &settings)
        }
        Commands::Bruteforce {
            archive,
            length,
            charset,
            common,
        } => {
            let settings = setup_settings(Some(common), charset.as_deref(), None);
            handle_bruteforce(archive, *length, &settings)
        }
        Commands::Generate {
            length,
            output,
            charset,
            yes,
            verbose,
        } => {
            let mut settings = setup_settings(None, charset.as_deref(), *verbose);
            settings.assume_yes = *yes;
            handle_generate(*length, output, &settings)
        }
        Commands::Estimate { length, charset } => {
            let settings = setup_settings(None, charset.as_deref(), None);
            handle_estimate(*length, &settings)
        }
    }
}
