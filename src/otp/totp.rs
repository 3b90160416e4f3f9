//! Time-based one-time passwords.
//!
//! `counter = floor((t - epoch) / step)`, then HOTP. Instants before the
//! epoch give negative counters, which are fed to HOTP in two's complement.
//!
//! Steps are limited to [`MAX_STEP_SECS`] and the validation window to
//! [`MAX_LOOK_BACK`]. Shifting the clock past the representable range
//! saturates at `DateTime::<Utc>::MIN_UTC` / `MAX_UTC`.

use chrono::{DateTime, Duration, Utc};

use super::clock::{Clock, SystemClock};
use super::hotp::Hotp;
use super::{OtpError, DEFAULT_LOOK_BACK, MAX_LOOK_BACK, MAX_STEP_SECS};
use crate::crypto::constant_time_eq;

/// TOTP generator and validator
#[derive(Debug, Clone)]
pub struct Totp<C = SystemClock> {
    hotp: Hotp,
    epoch: DateTime<Utc>,
    step_secs: i64,
    look_back: u32,
    clock: C,
}

impl Totp<SystemClock> {
    /// Create with the Unix epoch, the system clock and a one-step look-back
    pub fn new(hotp: Hotp, step_secs: u64) -> Result<Self, OtpError> {
        let step_secs = check_step(step_secs)?;
        Ok(Self {
            hotp,
            epoch: DateTime::<Utc>::UNIX_EPOCH,
            step_secs,
            look_back: DEFAULT_LOOK_BACK,
            clock: SystemClock,
        })
    }
}

impl<C: Clock> Totp<C> {
    /// Count steps from `epoch` instead of the Unix epoch
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    /// Number of past steps [`Totp::validate`] accepts besides the current
    /// one, at most [`MAX_LOOK_BACK`]
    pub fn with_look_back(mut self, steps: u32) -> Result<Self, OtpError> {
        self.look_back = check_look_back(steps)?;
        Ok(self)
    }

    /// Replace the time source
    pub fn with_clock<D: Clock>(self, clock: D) -> Totp<D> {
        Totp {
            hotp: self.hotp,
            epoch: self.epoch,
            step_secs: self.step_secs,
            look_back: self.look_back,
            clock,
        }
    }

    /// Underlying HOTP generator
    pub fn hotp(&self) -> &Hotp {
        &self.hotp
    }

    /// Step length in seconds
    pub fn step_secs(&self) -> u64 {
        self.step_secs as u64
    }

    /// Accepted past steps
    pub fn look_back(&self) -> u32 {
        self.look_back
    }

    /// Step counter for `instant`, floored
    pub fn counter_at(&self, instant: DateTime<Utc>) -> i64 {
        let elapsed_ms = (instant - self.epoch).num_milliseconds();
        elapsed_ms.div_euclid(self.step_secs * 1000)
    }

    /// Numeric code at `instant`
    pub fn value_at(&self, instant: DateTime<Utc>) -> u32 {
        self.hotp.value(self.counter_at(instant) as u64)
    }

    /// Code at `instant`
    pub fn at(&self, instant: DateTime<Utc>) -> String {
        self.hotp.format(self.value_at(instant))
    }

    /// Current code
    pub fn now(&self) -> String {
        self.at(self.clock.now())
    }

    /// Current numeric code
    pub fn now_value(&self) -> u32 {
        self.value_at(self.clock.now())
    }

    /// Code for the previous step
    pub fn prev(&self) -> String {
        self.at(self.shift(self.clock.now(), -1))
    }

    /// Numeric code for the previous step
    pub fn prev_value(&self) -> u32 {
        self.value_at(self.shift(self.clock.now(), -1))
    }

    /// Code for the next step
    pub fn next(&self) -> String {
        self.at(self.shift(self.clock.now(), 1))
    }

    /// Numeric code for the next step
    pub fn next_value(&self) -> u32 {
        self.value_at(self.shift(self.clock.now(), 1))
    }

    /// Check `candidate` against the current step and `look_back` past
    /// steps. Every window code is compared; there is no early exit.
    pub fn validate(&self, candidate: &str) -> bool {
        let now = self.clock.now();
        let mut matched = false;
        for back in 0..=self.look_back {
            let code = self.at(self.shift(now, -(back as i32)));
            matched |= constant_time_eq(code.as_bytes(), candidate.as_bytes());
        }
        if !matched {
            tracing::debug!(look_back = self.look_back, "TOTP code rejected");
        }
        matched
    }

    /// `instant + steps * step`, saturating at the ends of the time range
    fn shift(&self, instant: DateTime<Utc>, steps: i32) -> DateTime<Utc> {
        let delta = self.step() * steps;
        instant.checked_add_signed(delta).unwrap_or(if steps < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    fn step(&self) -> Duration {
        Duration::seconds(self.step_secs)
    }
}

/// Validate a step length, returning it as signed seconds
pub(crate) fn check_step(step_secs: u64) -> Result<i64, OtpError> {
    if step_secs == 0 || step_secs > MAX_STEP_SECS {
        return Err(OtpError::InvalidStep {
            max: MAX_STEP_SECS,
            actual: step_secs,
        });
    }
    Ok(step_secs as i64)
}

/// Validate a look-back window
pub(crate) fn check_look_back(steps: u32) -> Result<u32, OtpError> {
    if steps > MAX_LOOK_BACK {
        return Err(OtpError::InvalidLookBack {
            max: MAX_LOOK_BACK,
            actual: steps,
        });
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MacAlgorithm;
    use crate::otp::FixedClock;

    const SHA1_KEY: &[u8] = b"12345678901234567890";
    const SHA256_KEY: &[u8] = b"12345678901234567890123456789012";
    const SHA512_KEY: &[u8] =
        b"1234567890123456789012345678901234567890123456789012345678901234";

    const TIMES: [i64; 6] = [59, 1111111109, 1111111111, 1234567890, 2000000000, 20000000000];

    fn instant(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn rfc6238(key: &[u8], algorithm: MacAlgorithm) -> Totp {
        Totp::new(Hotp::new(key, 8, algorithm).unwrap(), 30).unwrap()
    }

    #[test]
    fn test_rfc6238_sha1() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1);
        let expected = ["94287082", "07081804", "14050471", "89005924", "69279037", "65353130"];
        for (t, code) in TIMES.iter().zip(expected) {
            assert_eq!(totp.at(instant(*t)), code, "t={t}");
        }
    }

    #[test]
    fn test_rfc6238_sha256() {
        let totp = rfc6238(SHA256_KEY, MacAlgorithm::HmacSha256);
        let expected = ["46119246", "68084774", "67062674", "91819424", "90698825", "77737706"];
        for (t, code) in TIMES.iter().zip(expected) {
            assert_eq!(totp.at(instant(*t)), code, "t={t}");
        }
    }

    #[test]
    fn test_rfc6238_sha512() {
        let totp = rfc6238(SHA512_KEY, MacAlgorithm::HmacSha512);
        let expected = ["90693936", "25091201", "99943326", "93441116", "38618901", "47863826"];
        for (t, code) in TIMES.iter().zip(expected) {
            assert_eq!(totp.at(instant(*t)), code, "t={t}");
        }
    }

    #[test]
    fn test_counter_floor_division() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1);
        assert_eq!(totp.counter_at(instant(0)), 0);
        assert_eq!(totp.counter_at(instant(29)), 0);
        assert_eq!(totp.counter_at(instant(30)), 1);
        assert_eq!(totp.counter_at(instant(-1)), -1);
        assert_eq!(totp.counter_at(instant(-30)), -1);
        assert_eq!(totp.counter_at(instant(-31)), -2);
    }

    #[test]
    fn test_custom_epoch() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1).with_epoch(instant(1_000));
        assert_eq!(totp.counter_at(instant(1_000)), 0);
        assert_eq!(totp.counter_at(instant(1_059)), 1);
    }

    #[test]
    fn test_prev_now_next() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1).with_clock(FixedClock(instant(59)));
        assert_eq!(totp.now(), "94287082");
        assert_eq!(totp.prev(), totp.at(instant(29)));
        assert_eq!(totp.next(), totp.at(instant(89)));
        assert_eq!(totp.now_value(), 94287082);
        assert_eq!(totp.prev_value(), totp.value_at(instant(29)));
        assert_eq!(totp.next_value(), totp.value_at(instant(89)));
    }

    #[test]
    fn test_validate_default_window() {
        let totp =
            rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1).with_clock(FixedClock(instant(1_000_000)));
        let now = instant(1_000_000);

        assert!(totp.validate(&totp.at(now)));
        assert!(totp.validate(&totp.at(now - Duration::seconds(30))));
        assert!(!totp.validate(&totp.at(now - Duration::seconds(60))));
        assert!(!totp.validate(&totp.at(now + Duration::seconds(30))));
    }

    #[test]
    fn test_validate_wide_window() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1)
            .with_look_back(2)
            .unwrap()
            .with_clock(FixedClock(instant(1_000_000)));
        let now = instant(1_000_000);

        assert!(totp.validate(&totp.at(now - Duration::seconds(60))));
        assert!(!totp.validate(&totp.at(now - Duration::seconds(90))));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1).with_clock(FixedClock(instant(59)));
        assert!(!totp.validate(""));
        assert!(!totp.validate("9428708"));
        assert!(!totp.validate("942870820"));
        assert!(!totp.validate("abcdefgh"));
    }

    #[test]
    fn test_step_bounds() {
        let hotp = Hotp::new(SHA1_KEY, 6, MacAlgorithm::HmacSha1).unwrap();
        for step in [0, MAX_STEP_SECS + 1, 1u64 << 60, u64::MAX] {
            assert_eq!(
                Totp::new(hotp.clone(), step).unwrap_err(),
                OtpError::InvalidStep {
                    max: MAX_STEP_SECS,
                    actual: step
                }
            );
        }
        assert_eq!(Totp::new(hotp, MAX_STEP_SECS).unwrap().step_secs(), MAX_STEP_SECS);
    }

    #[test]
    fn test_longest_step_never_panics() {
        let hotp = Hotp::new(SHA1_KEY, 6, MacAlgorithm::HmacSha1).unwrap();
        let totp = Totp::new(hotp, MAX_STEP_SECS)
            .unwrap()
            .with_look_back(MAX_LOOK_BACK)
            .unwrap()
            .with_clock(FixedClock(instant(1_700_000_000)));

        assert_eq!(totp.now().len(), 6);
        assert_ne!(totp.prev(), totp.next());
        assert!(totp.validate(&totp.now()));
        assert!(totp.validate(&totp.prev()));
    }

    #[test]
    fn test_shift_saturates_at_time_range() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1);
        let late = totp.clone().with_clock(FixedClock(DateTime::<Utc>::MAX_UTC));
        assert_eq!(late.next(), late.now());

        let early = totp.with_clock(FixedClock(DateTime::<Utc>::MIN_UTC));
        assert_eq!(early.prev(), early.now());
        assert!(early.validate(&early.now()));
    }

    #[test]
    fn test_look_back_bounds() {
        let totp = rfc6238(SHA1_KEY, MacAlgorithm::HmacSha1);
        assert_eq!(totp.clone().with_look_back(0).unwrap().look_back(), 0);
        assert_eq!(
            totp.clone().with_look_back(MAX_LOOK_BACK).unwrap().look_back(),
            MAX_LOOK_BACK
        );
        for steps in [MAX_LOOK_BACK + 1, i32::MAX as u32 + 1, u32::MAX] {
            assert_eq!(
                totp.clone().with_look_back(steps).unwrap_err(),
                OtpError::InvalidLookBack {
                    max: MAX_LOOK_BACK,
                    actual: steps
                }
            );
        }
    }
}
