//! One-Time Password Test Suite
//!
//! - **Phase 1**: RFC 4226 HOTP vectors
//! - **Phase 2**: RFC 6238 TOTP vectors for SHA-1, SHA-256 and SHA-512
//! - **Phase 3**: Validation window against a fixed clock

use chrono::{DateTime, Duration, Utc};
use whisper::crypto::MacAlgorithm;
use whisper::otp::{FixedClock, Hotp, OtpError, Totp};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

// =============================================================================
// PHASE 1: HOTP
// =============================================================================

/// Phase 1: RFC 4226 Appendix D
#[test]
fn test_hotp_rfc4226() {
    let hotp = Hotp::new(b"12345678901234567890", 6, MacAlgorithm::HmacSha1).unwrap();
    let codes: Vec<String> = (0..10).map(|c| hotp.generate(c)).collect();
    assert_eq!(
        codes,
        [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489"
        ]
    );
}

/// Phase 1: Digit bounds are enforced at construction
#[test]
fn test_hotp_digit_bounds() {
    for digits in [0, 3, 9, 10] {
        assert!(matches!(
            Hotp::new(b"key", digits, MacAlgorithm::HmacSha256),
            Err(OtpError::InvalidDigits { .. })
        ));
    }
    for digits in 4..=8 {
        let hotp = Hotp::new(b"key", digits, MacAlgorithm::HmacSha256).unwrap();
        assert_eq!(hotp.generate(0).len(), digits as usize);
    }
}

// =============================================================================
// PHASE 2: TOTP
// =============================================================================

const TIMES: [i64; 6] = [59, 1111111109, 1111111111, 1234567890, 2000000000, 20000000000];

fn check_rfc6238(key: &[u8], algorithm: MacAlgorithm, expected: [&str; 6]) {
    let totp = Totp::new(Hotp::new(key, 8, algorithm).unwrap(), 30).unwrap();
    for (t, code) in TIMES.into_iter().zip(expected) {
        assert_eq!(totp.at(at(t)), code, "{algorithm} t={t}");
    }
}

/// Phase 2: RFC 6238 Appendix B, SHA-1
#[test]
fn test_totp_rfc6238_sha1() {
    check_rfc6238(
        b"12345678901234567890",
        MacAlgorithm::HmacSha1,
        ["94287082", "07081804", "14050471", "89005924", "69279037", "65353130"],
    );
}

/// Phase 2: RFC 6238 Appendix B, SHA-256
#[test]
fn test_totp_rfc6238_sha256() {
    check_rfc6238(
        b"12345678901234567890123456789012",
        MacAlgorithm::HmacSha256,
        ["46119246", "68084774", "67062674", "91819424", "90698825", "77737706"],
    );
}

/// Phase 2: RFC 6238 Appendix B, SHA-512
#[test]
fn test_totp_rfc6238_sha512() {
    check_rfc6238(
        b"1234567890123456789012345678901234567890123456789012345678901234",
        MacAlgorithm::HmacSha512,
        ["90693936", "25091201", "99943326", "93441116", "38618901", "47863826"],
    );
}

// =============================================================================
// PHASE 3: VALIDATION WINDOW
// =============================================================================

fn fixed_totp(now: i64, look_back: u32) -> Totp<FixedClock> {
    let hotp = Hotp::new(b"12345678901234567890", 6, MacAlgorithm::HmacSha256).unwrap();
    Totp::new(hotp, 30)
        .unwrap()
        .with_look_back(look_back)
        .unwrap()
        .with_clock(FixedClock(at(now)))
}

/// Phase 3: Current and previous step pass, older and future steps fail
#[test]
fn test_default_window() {
    let totp = fixed_totp(1_700_000_000, 1);
    let now = at(1_700_000_000);

    assert!(totp.validate(&totp.now()));
    assert!(totp.validate(&totp.prev()));
    assert!(!totp.validate(&totp.at(now - Duration::seconds(60))));
    assert!(!totp.validate(&totp.next()));
}

/// Phase 3: A wider look-back accepts two steps back
#[test]
fn test_two_step_window() {
    let totp = fixed_totp(1_700_000_000, 2);
    let now = at(1_700_000_000);

    assert!(totp.validate(&totp.at(now - Duration::seconds(60))));
    assert!(!totp.validate(&totp.at(now - Duration::seconds(90))));
}

/// Phase 3: Zero look-back accepts only the current step
#[test]
fn test_zero_look_back() {
    let totp = fixed_totp(1_700_000_000, 0);
    assert!(totp.validate(&totp.now()));
    assert!(!totp.validate(&totp.prev()));
}
