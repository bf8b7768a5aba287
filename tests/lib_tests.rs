use std::io::Write;
use std::time::Duration;

use crossbeam_channel::bounded;
use zipcrack::engine::{combination_count, estimate_count, group_thousands, preset, resolve_charset};
use zipcrack::pipeline::{CandidateSource, FoundPassword, RunState, decode_line, run_producer_loop};
use zipcrack::utils::wordlist_file::temp_path_for;
use zipcrack::utils::write_wordlist;
use zipcrack::{AttackPlan, CrackError, ErrorKind, estimate_combinations};

fn collect(source: CandidateSource) -> Vec<String> {
    source.map(|c| c.unwrap()).collect()
}

fn wordlist_file(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents).unwrap();
    f.flush().unwrap();
    f
}

// --- charset presets ---

#[test]
fn test_preset_sizes() {
    assert_eq!(preset("lower").unwrap().len(), 26);
    assert_eq!(preset("upper").unwrap().len(), 26);
    assert_eq!(preset("letters").unwrap().len(), 52);
    assert_eq!(preset("alphanum").unwrap().len(), 62);
    assert_eq!(preset("MiniASCII").unwrap().len(), 36);
    assert_eq!(preset("all").unwrap().len(), 94);
}

#[test]
fn test_preset_order() {
    assert!(preset("MiniASCII").unwrap().starts_with("abc"));
    assert!(preset("MiniASCII").unwrap().ends_with("789"));
    assert!(preset("letters").unwrap().starts_with("abcdefghijklmnopqrstuvwxyzABC"));
    assert!(preset("all").unwrap().ends_with("{|}~"));
}

#[test]
fn test_preset_names_are_case_sensitive() {
    assert!(preset("LOWER").is_none());
    assert_eq!(resolve_charset("LOWER").unwrap(), vec!['L', 'O', 'W', 'E', 'R']);
}

#[test]
fn test_literal_charset_kept_verbatim() {
    assert_eq!(resolve_charset("ba9").unwrap(), vec!['b', 'a', '9']);
    assert_eq!(resolve_charset("aa").unwrap(), vec!['a', 'a']);
}

#[test]
fn test_empty_charset_rejected() {
    let err = resolve_charset("").unwrap_err();
    assert!(matches!(err, CrackError::InvalidCharset));
    assert_eq!(err.kind(), ErrorKind::Input);
}

// --- estimates ---

#[test]
fn test_estimate_small() {
    assert_eq!(estimate_combinations(3, "ab").unwrap(), 14);
    assert_eq!(estimate_combinations(1, "lower").unwrap(), 26);
    assert_eq!(estimate_combinations(2, "MiniASCII").unwrap(), 36 + 36 * 36);
}

#[test]
fn test_estimate_large_all_charset() {
    let expected: u128 = (1..=8).map(|i| 94u128.pow(i)).sum();
    assert_eq!(estimate_count(8, "all").unwrap(), expected);
    let expected: u128 = (1..=16).map(|i| 94u128.pow(i)).sum();
    assert_eq!(estimate_count(16, "all").unwrap(), expected);
}

#[test]
fn test_estimate_overflow_is_an_error() {
    assert!(matches!(combination_count(94, 40), Err(CrackError::Overflow)));
}

#[test]
fn test_estimate_rejects_zero_length() {
    assert!(matches!(
        estimate_combinations(0, "ab"),
        Err(CrackError::InvalidLength(0))
    ));
}

#[test]
fn test_estimate_matches_enumeration() {
    for (len, charset) in [(1, "a"), (3, "ab"), (2, "lower"), (4, "xyz"), (2, "MiniASCII")] {
        let source = CandidateSource::from_bruteforce(len, charset).unwrap();
        let enumerated = source.count() as u128;
        assert_eq!(
            enumerated,
            estimate_combinations(len, charset).unwrap(),
            "len {len}, charset {charset}"
        );
    }
}

// --- brute-force ordering ---

#[test]
fn test_bruteforce_order_ab_3() {
    let got = collect(CandidateSource::from_bruteforce(3, "ab").unwrap());
    let expected = vec![
        "a", "b", "aa", "ab", "ba", "bb", "aaa", "aab", "aba", "abb", "baa", "bab", "bba", "bbb",
    ];
    assert_eq!(got, expected);
}

#[test]
fn test_bruteforce_single_char_alphabet() {
    let got = collect(CandidateSource::from_bruteforce(3, "z").unwrap());
    assert_eq!(got, vec!["z", "zz", "zzz"]);
}

#[test]
fn test_bruteforce_is_reproducible() {
    let a = collect(CandidateSource::from_bruteforce(2, "MiniASCII").unwrap());
    let b = collect(CandidateSource::from_bruteforce(2, "MiniASCII").unwrap());
    assert_eq!(a, b);
    assert_eq!(a.first().map(String::as_str), Some("a"));
    assert_eq!(a.last().map(String::as_str), Some("99"));
}

#[test]
fn test_bruteforce_invalid_params() {
    assert!(matches!(
        CandidateSource::from_bruteforce(0, "ab"),
        Err(CrackError::InvalidLength(0))
    ));
    assert!(matches!(
        CandidateSource::from_bruteforce(2, ""),
        Err(CrackError::InvalidCharset)
    ));
}

#[test]
fn test_bruteforce_total_hint() {
    let source = CandidateSource::from_plan(&AttackPlan::Bruteforce {
        max_length: 3,
        charset: "ab".to_string(),
    })
    .unwrap();
    assert_eq!(source.total_hint(), Some(14));
}

// --- wordlist reading ---

#[test]
fn test_wordlist_trims_and_skips_blank_lines() {
    let f = wordlist_file(b"alpha\n\n  beta  \r\n\t\n   \ngamma");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert_eq!(got, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_wordlist_keeps_duplicates_in_order() {
    let f = wordlist_file(b"b\na\nb\n");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert_eq!(got, vec!["b", "a", "b"]);
}

#[test]
fn test_wordlist_drops_invalid_bytes() {
    let f = wordlist_file(b"caf\xe9\nok\n\xff\xfe\n");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert_eq!(got, vec!["caf", "ok"]);
}

#[test]
fn test_wordlist_bare_cr_line_endings() {
    let f = wordlist_file(b"alpha\rbeta\rgamma\r");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert_eq!(got, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_wordlist_mixed_line_endings() {
    let f = wordlist_file(b"one\r\ntwo\nthree\rfour\r\n\r\nfive");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert_eq!(got, vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn test_decode_line_keeps_encoded_replacement_char() {
    let mut line = "pa\u{FFFD}ss".as_bytes().to_vec();
    line.push(0xff);
    assert_eq!(decode_line(&line), "pa\u{FFFD}ss");
    assert_eq!(decode_line(b"\xffab\xc3cd\xe2\x82"), "abcd");
}

#[test]
fn test_decode_line_valid_utf8_untouched() {
    assert_eq!(decode_line("pässwörd\n".as_bytes()), "pässwörd\n");
}

#[test]
fn test_wordlist_blank_only_is_empty() {
    let f = wordlist_file(b"\n\n   \n\r\n");
    let got = collect(CandidateSource::from_wordlist_file(f.path()).unwrap());
    assert!(got.is_empty());
}

#[test]
fn test_wordlist_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    match CandidateSource::from_wordlist_file(&missing) {
        Err(CrackError::NotFound(p)) => assert_eq!(p, missing),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected NotFound"),
    }
}

#[test]
fn test_wordlist_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        CandidateSource::from_wordlist_file(dir.path()),
        Err(CrackError::Io { .. })
    ));
}

#[test]
fn test_list_source_skips_blank_entries() {
    let source = CandidateSource::from_list(["one", "", "  two ", "\t"]);
    assert_eq!(source.total_hint(), Some(2));
    assert_eq!(collect(source), vec!["one", "two"]);
}

// --- producer ---

#[test]
fn test_producer_queues_everything_then_disconnects() {
    let (tx, rx) = bounded(4);
    let state = RunState::new();
    let consumer = std::thread::spawn(move || rx.iter().collect::<Vec<String>>());
    let source = CandidateSource::from_bruteforce(3, "ab").unwrap();
    let queued = run_producer_loop(source, tx, &state, 3, Duration::from_millis(10));
    assert_eq!(queued, 14);
    let received = consumer.join().unwrap();
    assert_eq!(received.len(), 14);
    assert_eq!(received[0], "a");
}

#[test]
fn test_producer_stops_when_cancelled() {
    let (tx, rx) = bounded(2);
    let state = RunState::new();
    state.cancel();
    let source = CandidateSource::from_bruteforce(6, "lower").unwrap();
    let queued = run_producer_loop(source, tx, &state, 100, Duration::from_millis(10));
    assert_eq!(queued, 0);
    assert!(rx.recv().is_err());
}

#[test]
fn test_producer_unblocks_on_cancel_while_queue_full() {
    let (tx, rx) = bounded(2);
    let state = std::sync::Arc::new(RunState::new());
    let producer_state = std::sync::Arc::clone(&state);
    let producer = std::thread::spawn(move || {
        let source = CandidateSource::from_bruteforce(6, "lower").unwrap();
        run_producer_loop(source, tx, &producer_state, 10, Duration::from_millis(10))
    });
    std::thread::sleep(Duration::from_millis(50));
    state.cancel();
    let queued = producer.join().unwrap();
    assert_eq!(queued, 2);
    drop(rx);
}

#[test]
fn test_producer_records_source_error() {
    let (tx, rx) = bounded(10);
    let state = RunState::new();
    let items: Vec<Result<String, CrackError>> = vec![
        Ok("a".to_string()),
        Err(CrackError::Runtime("disk gone".to_string())),
        Ok("never".to_string()),
    ];
    let queued = run_producer_loop(items, tx, &state, 5, Duration::from_millis(10));
    assert_eq!(queued, 1);
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(state.first_error().as_deref(), Some("disk gone"));
}

// --- run state ---

#[test]
fn test_claim_success_only_once() {
    let state = std::sync::Arc::new(RunState::new());
    let winners: usize = (0..8)
        .map(|i| {
            let state = std::sync::Arc::clone(&state);
            std::thread::spawn(move || {
                let found = FoundPassword {
                    password: format!("pw{i}"),
                    worker_id: i,
                };
                state.claim(found) as usize
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .sum();
    assert_eq!(winners, 1);
    assert!(state.should_stop());
    let winner = state.winner().unwrap();
    assert_eq!(winner.password, format!("pw{}", winner.worker_id));
    assert!(state.extraction().is_none());
}

#[test]
fn test_attempts_counted_across_threads() {
    let state = std::sync::Arc::new(RunState::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = std::sync::Arc::clone(&state);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    state.record_attempt();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(state.attempts(), 8000);
}

// --- generated wordlists ---

#[test]
fn test_write_wordlist_matches_generation_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("list.txt");
    let source = CandidateSource::from_bruteforce(2, "xy").unwrap();
    let written = write_wordlist(&out, source).unwrap();
    assert_eq!(written, 6);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "x\ny\nxx\nxy\nyx\nyy\n");
    assert!(!temp_path_for(&out).exists());
}

#[test]
fn test_write_wordlist_error_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("list.txt");
    let items: Vec<Result<String, CrackError>> = vec![
        Ok("a".to_string()),
        Err(CrackError::Runtime("source broke".to_string())),
    ];
    assert!(write_wordlist(&out, items).is_err());
    assert!(!out.exists());
    assert!(!temp_path_for(&out).exists());
}

#[test]
fn test_generated_wordlist_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("list.txt");
    write_wordlist(&out, CandidateSource::from_bruteforce(3, "ab").unwrap()).unwrap();
    let from_file = collect(CandidateSource::from_wordlist_file(&out).unwrap());
    let generated = collect(CandidateSource::from_bruteforce(3, "ab").unwrap());
    assert_eq!(from_file, generated);
}

// --- report formatting ---

#[test]
fn test_group_thousands() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1_234_567), "1,234,567");
}
