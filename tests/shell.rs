//! Shell Session Test Suite
//!
//! Drives [`ShellContext`] the way the binary does, over key files written
//! to a temporary directory.
//!
//! - **Phase 1**: Key files - load, merge and reject
//! - **Phase 2**: Sessions - scripted input through `run`

use std::path::Path;

use whisper::crypto::{KeyAlgorithm, KeyMaterial, MacKeying};
use whisper::obfuscate::{IdCodec, Obfuscator};
use whisper::shell::{KeyFile, ShellContext};

const ALPHA: &str = "AAECAwQFBgcICQoLDA0ODw==";
const BETA: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

fn write_keys(dir: &Path, name: &str, keys: &[(&str, &str)]) {
    let mut file = KeyFile::default();
    for (key_name, key) in keys {
        file.keys.insert((*key_name).to_string(), (*key).to_string());
    }
    std::fs::write(dir.join(name), file.to_json().unwrap()).unwrap();
}

fn session(shell: &mut ShellContext, script: &str) -> (String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    shell.run(script.as_bytes(), &mut out, &mut err, false).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

// =============================================================================
// PHASE 1: KEY FILES
// =============================================================================

/// Phase 1: Two files accumulate into one keyring
#[test]
fn test_load_two_files() {
    let dir = tempfile::tempdir().unwrap();
    write_keys(dir.path(), "a.json", &[("alpha", ALPHA)]);
    write_keys(dir.path(), "b.json", &[("beta", BETA)]);

    let mut shell = ShellContext::new(dir.path());
    assert_eq!(shell.load_keys(Path::new("a.json")).unwrap(), 1);
    assert_eq!(shell.load_keys(Path::new("b.json")).unwrap(), 1);
    assert_eq!(shell.keyring().len(), 2);
}

/// Phase 1: Bad base64 names the offending key
#[test]
fn test_bad_key_named_in_error() {
    let dir = tempfile::tempdir().unwrap();
    write_keys(dir.path(), "bad.json", &[("broken", "***")]);

    let mut shell = ShellContext::new(dir.path());
    let err = shell.load_keys(Path::new("bad.json")).unwrap_err();
    assert!(err.to_string().contains("broken"));
    assert!(shell.keyring().is_empty());
}

/// Phase 1: Invalid JSON is a key file error carrying the path
#[test]
fn test_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keys.json"), "{ not json").unwrap();

    let mut shell = ShellContext::new(dir.path());
    let err = shell.load_keys(Path::new("keys.json")).unwrap_err();
    assert!(err.to_string().contains("keys.json"));
}

// =============================================================================
// PHASE 2: SESSIONS
// =============================================================================

/// Phase 2: Scripted session produces ids a standalone codec can restore
#[test]
fn test_session_interoperates_with_codec() {
    let dir = tempfile::tempdir().unwrap();
    write_keys(dir.path(), "keys.json", &[("alpha", ALPHA), ("beta", BETA)]);

    let mut shell = ShellContext::new(dir.path());
    let (out, err) = session(&mut shell, "loadkeys keys.json\nselectkey alpha\nobfuscate 4242\n");
    assert!(err.is_empty(), "{err}");

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Load 2 keys from keys.json");
    assert_eq!(lines[1], "active key: alpha");

    let codec = Obfuscator::from_key(KeyMaterial::from_base64(KeyAlgorithm::Aes, ALPHA).unwrap())
        .unwrap();
    assert_eq!(codec.restore(lines[2]).unwrap(), 4242);
}

/// Phase 2: Errors go to the error stream and the session continues
#[test]
fn test_errors_do_not_end_session() {
    let dir = tempfile::tempdir().unwrap();
    write_keys(dir.path(), "keys.json", &[("alpha", ALPHA)]);

    let mut shell = ShellContext::new(dir.path());
    let script = "obfuscate 1\nloadkeys keys.json\nselectkey alpha\nrestore zzz\nobfuscate -1\n";
    let (out, err) = session(&mut shell, script);

    assert_eq!(err.lines().count(), 2, "{err}");
    assert!(err.contains("No active key"));
    assert!(err.contains("Bad string format"));
    assert_eq!(out.lines().count(), 3);
}

/// Phase 2: Derived keying in the shell differs from the shared default
#[test]
fn test_shell_keying() {
    let dir = tempfile::tempdir().unwrap();
    write_keys(dir.path(), "keys.json", &[("alpha", ALPHA)]);

    let mut shared = ShellContext::new(dir.path());
    let mut derived = ShellContext::new(dir.path()).with_keying(MacKeying::Derived);
    for shell in [&mut shared, &mut derived] {
        shell.load_keys(Path::new("keys.json")).unwrap();
        shell.select_key("alpha").unwrap();
    }

    let text = shared.obfuscate(77).unwrap();
    assert_ne!(derived.obfuscate(77).unwrap(), text);
    assert!(derived.restore(&text).is_err());
    assert_eq!(shared.restore(&text).unwrap(), 77);
}

/// Phase 2: Input after `exit` is never executed
#[test]
fn test_exit_stops_reading() {
    let mut shell = ShellContext::new(".");
    let (out, err) = session(&mut shell, "pwd\nexit\nhelp\n");
    assert_eq!(out, ".\n");
    assert!(err.is_empty());
}
