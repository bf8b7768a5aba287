//! Write candidates to a wordlist file, one per line, through a temp file renamed into place.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Candidate;
use crate::error::CrackError;
use crate::utils::config::PackagePaths;

/// Temp path next to `out_path` used while writing.
pub fn temp_path_for(out_path: &Path) -> PathBuf {
    let name = out_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PackagePaths::get().pkg_name().to_string());
    out_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}{}", PackagePaths::get().temp_suffix()))
}

/// Write every candidate from `candidates` to `out_path`. Returns the number written.
/// The final file only appears once all candidates were written; on error the temp file is removed.
pub fn write_wordlist<I>(out_path: &Path, candidates: I) -> Result<usize>
where
    I: IntoIterator<Item = std::result::Result<Candidate, CrackError>>,
{
    let temp_path = temp_path_for(out_path);
    let written = write_lines(&temp_path, candidates).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })?;
    rename_temp_to_final(&temp_path, out_path)?;
    Ok(written)
}

fn write_lines<I>(path: &Path, candidates: I) -> Result<usize>
where
    I: IntoIterator<Item = std::result::Result<Candidate, CrackError>>,
{
    let file =
        File::create(path).with_context(|| format!("create wordlist at {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut count = 0_usize;
    for candidate in candidates {
        let candidate = candidate?;
        out.write_all(candidate.as_bytes())?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()
        .with_context(|| format!("flush wordlist at {}", path.display()))?;
    Ok(count)
}

pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "rename temp wordlist to final path ({} -> {})",
            temp_path.display(),
            final_path.display()
        )
    })
}
