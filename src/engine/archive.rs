//! Archive password-check capability.
//!
//! The pipeline only needs two things from an archive: open an independent handle per worker,
//! and ask a handle whether a password opens it. [`ZipOpener`] implements both with the `zip` crate.

use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::CrackError;

/// Answer of one password check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The password decrypts the archive.
    Opened,
    /// The archive rejected the password.
    WrongPassword,
    /// The check itself failed for another reason.
    OtherError(String),
}

/// One open archive, owned by a single worker.
pub trait PasswordCheck: Send + 'static {
    /// Test `candidate` without side effects.
    fn try_password(&mut self, candidate: &str) -> CheckOutcome;

    /// Extract the whole archive into `dest` with a password already confirmed by [`try_password`](Self::try_password).
    fn extract(&mut self, password: &str, dest: &Path) -> Result<PathBuf, CrackError>;
}

/// Opens independent handles on the same archive.
pub trait ArchiveOpener {
    type Handle: PasswordCheck;

    fn open(&self) -> Result<Self::Handle, CrackError>;
}

/// Opens a zip archive on disk.
#[derive(Clone, Debug)]
pub struct ZipOpener {
    path: PathBuf,
}

impl ZipOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn archive_error(&self, err: ZipError) -> CrackError {
        archive_error_at(&self.path, err)
    }
}

impl ArchiveOpener for ZipOpener {
    type Handle = ZipHandle;

    fn open(&self) -> Result<ZipHandle, CrackError> {
        let file = File::open(&self.path).map_err(|e| CrackError::from_io(&self.path, e))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| self.archive_error(e))?;
        let check_entry = smallest_encrypted_entry(&mut archive)
            .map_err(|e| self.archive_error(e))?
            .ok_or_else(|| CrackError::NotEncrypted(self.path.clone()))?;
        debug!("{}: checking passwords against entry #{}", self.path.display(), check_entry);
        Ok(ZipHandle {
            path: self.path.clone(),
            archive,
            check_entry,
        })
    }
}

/// Index of the encrypted file entry with the smallest compressed size.
fn smallest_encrypted_entry(
    archive: &mut ZipArchive<BufReader<File>>,
) -> Result<Option<usize>, ZipError> {
    let mut best: Option<(usize, u64)> = None;
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.is_dir() || !entry.encrypted() {
            continue;
        }
        let size = entry.compressed_size();
        if best.is_none_or(|(_, s)| size < s) {
            best = Some((i, size));
        }
    }
    Ok(best.map(|(i, _)| i))
}

/// A worker's own handle on a zip archive.
pub struct ZipHandle {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    check_entry: usize,
}

impl PasswordCheck for ZipHandle {
    fn try_password(&mut self, candidate: &str) -> CheckOutcome {
        let decrypted = self
            .archive
            .by_index_decrypt(self.check_entry, candidate.as_bytes());
        let mut entry = match decrypted {
            Ok(entry) => entry,
            Err(ZipError::InvalidPassword) => return CheckOutcome::WrongPassword,
            Err(e) => return CheckOutcome::OtherError(e.to_string()),
        };
        // The header check passes for ~1/256 wrong ZipCrypto keys; reading to the end verifies the CRC (or AES MAC).
        match io::copy(&mut entry, &mut io::sink()) {
            Ok(_) => CheckOutcome::Opened,
            Err(e) => read_failure_outcome(&e),
        }
    }

    fn extract(&mut self, password: &str, dest: &Path) -> Result<PathBuf, CrackError> {
        fs::create_dir_all(dest).map_err(|e| CrackError::from_io(dest, e))?;
        for i in 0..self.archive.len() {
            let encrypted = self
                .archive
                .by_index_raw(i)
                .map_err(|e| archive_error_at(&self.path, e))?
                .encrypted();
            let mut entry = if encrypted {
                self.archive.by_index_decrypt(i, password.as_bytes())
            } else {
                self.archive.by_index(i)
            }
            .map_err(|e| archive_error_at(&self.path, e))?;
            let Some(rel) = entry.enclosed_name() else {
                log::warn!("skipping entry with unsafe path: {}", entry.name());
                continue;
            };
            let out_path = dest.join(rel);
            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| CrackError::from_io(&out_path, e))?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| CrackError::from_io(parent, e))?;
            }
            let mut out = File::create(&out_path).map_err(|e| CrackError::from_io(&out_path, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| CrackError::from_io(&out_path, e))?;
        }
        Ok(dest.to_path_buf())
    }
}

/// Classify an error hit while reading a decrypted entry. Bad checksums and undecodable
/// compressed data come from a wrong key; anything else is a real read problem.
pub fn read_failure_outcome(err: &io::Error) -> CheckOutcome {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => CheckOutcome::WrongPassword,
        // Older zip releases report a CRC mismatch as `Other`.
        _ if err.to_string().contains("checksum") => CheckOutcome::WrongPassword,
        _ => CheckOutcome::OtherError(err.to_string()),
    }
}

fn archive_error_at(path: &Path, err: ZipError) -> CrackError {
    match err {
        ZipError::Io(e) => CrackError::from_io(path, e),
        other => CrackError::Archive {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
