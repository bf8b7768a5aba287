use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::unstable::write::FileOptionsExt;
use zip::write::{SimpleFileOptions, ZipWriter};
use zipcrack::engine::{
    ArchiveOpener, CheckOutcome, PasswordCheck, ZipOpener, read_failure_outcome,
};
use zipcrack::{CrackError, RunStatus, run_bruteforce_attack, run_wordlist_attack};

const README: &[u8] = b"top secret notes\n";
const DATA: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Write `name.zip` in `dir` with two entries (one nested), ZipCrypto-encrypted when `password` is set.
fn make_zip(dir: &Path, name: &str, password: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let mut zw = ZipWriter::new(File::create(&path).unwrap());
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let options = match password {
        Some(pw) => base.with_deprecated_encryption(pw.as_bytes()),
        None => base,
    };
    zw.start_file("readme.txt", options).unwrap();
    zw.write_all(README).unwrap();
    zw.add_directory("nested/", SimpleFileOptions::default()).unwrap();
    zw.start_file("nested/data.bin", options).unwrap();
    zw.write_all(DATA).unwrap();
    zw.finish().unwrap();
    path
}

fn write_lines(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("words.txt");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

// --- password checks ---

#[test]
fn test_handle_accepts_only_the_password() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("hunter2"));
    let mut handle = ZipOpener::new(&archive).open().unwrap();
    assert_eq!(handle.try_password("hunter2"), CheckOutcome::Opened);
    for wrong in ["hunter", "hunter3", "HUNTER2", "x", "password", "123456"] {
        assert_eq!(handle.try_password(wrong), CheckOutcome::WrongPassword, "{wrong}");
    }
    // Handle stays usable after wrong guesses.
    assert_eq!(handle.try_password("hunter2"), CheckOutcome::Opened);
}

#[test]
fn test_many_wrong_passwords_never_open() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("correct horse"));
    let mut handle = ZipOpener::new(&archive).open().unwrap();
    let opened = (0..2_000)
        .map(|i| format!("guess{i}"))
        .filter(|pw| handle.try_password(pw) == CheckOutcome::Opened)
        .count();
    assert_eq!(opened, 0);
}

#[test]
fn test_read_errors_from_garbage_mean_wrong_password() {
    let crc = std::io::Error::new(std::io::ErrorKind::InvalidData, "Invalid checksum");
    assert_eq!(read_failure_outcome(&crc), CheckOutcome::WrongPassword);
    let inflate = std::io::Error::new(std::io::ErrorKind::InvalidInput, "corrupt deflate stream");
    assert_eq!(read_failure_outcome(&inflate), CheckOutcome::WrongPassword);
    let legacy_crc = std::io::Error::other("Invalid checksum");
    assert_eq!(read_failure_outcome(&legacy_crc), CheckOutcome::WrongPassword);
}

#[test]
fn test_other_read_errors_are_reported() {
    let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "archive truncated");
    assert!(matches!(
        read_failure_outcome(&eof),
        CheckOutcome::OtherError(reason) if reason.contains("truncated")
    ));
    let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert!(matches!(read_failure_outcome(&denied), CheckOutcome::OtherError(_)));
}

#[test]
fn test_open_unencrypted_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "plain.zip", None);
    assert!(matches!(
        ZipOpener::new(&archive).open(),
        Err(CrackError::NotEncrypted(_))
    ));
}

#[test]
fn test_open_not_a_zip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.zip");
    fs::write(&path, b"definitely not a zip file").unwrap();
    assert!(matches!(
        ZipOpener::new(&path).open(),
        Err(CrackError::Archive { .. })
    ));
}

#[test]
fn test_open_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ZipOpener::new(dir.path().join("gone.zip")).open(),
        Err(CrackError::NotFound(_))
    ));
}

// --- wordlist attack ---

#[test]
fn test_wordlist_attack_finds_and_extracts() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("letmein"));
    let words = write_lines(dir.path(), &["123456", "", "password", "  letmein  ", "qwerty"]);
    let out = dir.path().join("out");

    let result = run_wordlist_attack(&archive, &out, &words, Some(2), 2);
    assert_eq!(result.status, RunStatus::Succeeded, "{:?}", result.error);
    assert!(result.success);
    assert_eq!(result.password.as_deref(), Some("letmein"));
    assert!(result.attempts >= 1 && result.attempts <= 4);
    assert_eq!(result.extracted_to.as_deref(), Some(out.as_path()));
    assert_eq!(fs::read(out.join("readme.txt")).unwrap(), README);
    assert_eq!(fs::read(out.join("nested").join("data.bin")).unwrap(), DATA);
}

#[test]
fn test_wordlist_attack_without_match() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("letmein"));
    let words = write_lines(dir.path(), &["a", "b", "c", "d", "e"]);
    let out = dir.path().join("out");

    let result = run_wordlist_attack(&archive, &out, &words, Some(3), 10);
    assert_eq!(result.status, RunStatus::Exhausted);
    assert!(!result.success);
    assert_eq!(result.attempts, 5);
    assert!(!out.join("readme.txt").exists());
}

#[test]
fn test_wordlist_attack_on_unencrypted_archive_fails() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "plain.zip", None);
    let words = write_lines(dir.path(), &["a"]);
    let result = run_wordlist_attack(&archive, &dir.path().join("out"), &words, Some(1), 10);
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.attempts, 0);
    assert!(result.error.as_deref().unwrap_or("").contains("no encrypted entries"));
}

#[test]
fn test_wordlist_attack_on_corrupt_archive_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.zip");
    fs::write(&path, b"PK\x03\x04 truncated").unwrap();
    let words = write_lines(dir.path(), &["a"]);
    let result = run_wordlist_attack(&path, &dir.path().join("out"), &words, Some(1), 10);
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.attempts, 0);
}

// --- brute-force attack ---

#[test]
fn test_bruteforce_attack_finds_short_password() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("cab"));
    let out = dir.path().join("out");

    let result = run_bruteforce_attack(&archive, &out, 3, "abc", Some(4), 16);
    assert_eq!(result.status, RunStatus::Succeeded, "{:?}", result.error);
    assert_eq!(result.password.as_deref(), Some("cab"));
    assert!(result.attempts <= 3 + 9 + 27);
    assert_eq!(fs::read(out.join("readme.txt")).unwrap(), README);
}

#[test]
fn test_bruteforce_attack_single_thread_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("ba"));
    let result = run_bruteforce_attack(&archive, &dir.path().join("out"), 2, "ab", Some(1), 4);
    assert!(result.success);
    assert_eq!(result.attempts, 5);
    assert_eq!(result.worker_id, Some(1));
}

#[test]
fn test_bruteforce_attack_password_too_long() {
    let dir = tempfile::tempdir().unwrap();
    let archive = make_zip(dir.path(), "locked.zip", Some("abcd"));
    let result = run_bruteforce_attack(&archive, &dir.path().join("out"), 2, "abcd", Some(2), 8);
    assert_eq!(result.status, RunStatus::Exhausted);
    assert_eq!(result.attempts, 4 + 16);
}
