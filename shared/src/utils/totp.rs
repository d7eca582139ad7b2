//! TOTP (Time-based One-Time Password) utilities
//!
//! This module generates and verifies one-time codes according to RFC 6238
//! (HMAC-SHA1, dynamic truncation from RFC 4226). Codes are compatible with
//! Google Authenticator, Authy and similar apps when used with the default
//! parameters: 30 second period, 6 digits.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::core::clock::TimeSource;
use crate::utils::base32;

type HmacSha1 = Hmac<Sha1>;

/// Default time step in seconds
pub const DEFAULT_PERIOD: u64 = 30;

/// Default number of code digits
pub const DEFAULT_DIGITS: u32 = 6;

/// Default number of steps accepted either side of the current one
pub const DEFAULT_WINDOW: u32 = 1;

/// Parameters shared by code generation and verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpParams {
    period: u64,
    digits: u32,
    window: u32,
}

impl TotpParams {
    /// Create parameters; a zero period or zero digits fall back to the defaults
    pub fn new(period: u64, digits: u32, window: u32) -> Self {
        Self {
            period: if period == 0 { DEFAULT_PERIOD } else { period },
            digits: if digits == 0 { DEFAULT_DIGITS } else { digits },
            window,
        }
    }

    /// Same parameters with a different verification window
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn window(&self) -> u32 {
        self.window
    }
}

impl Default for TotpParams {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, DEFAULT_DIGITS, DEFAULT_WINDOW)
    }
}

/// Time step counter for a Unix timestamp
pub fn time_step(timestamp: u64, period: u64) -> u64 {
    timestamp / period.max(1)
}

/// Generate the one-time code for a raw secret and counter
///
/// The counter is HMAC'd as 8 big-endian bytes, the digest is reduced with
/// RFC 4226 dynamic truncation, and the result is zero-padded to `digits`.
///
/// # Example
/// ```
/// use eventdesk_shared::utils::totp::generate_code;
///
/// // RFC 4226 appendix D, counter 1
/// assert_eq!(generate_code(b"12345678901234567890", 1, 6), "287082");
/// ```
pub fn generate_code(secret: &[u8], counter: u64, digits: u32) -> String {
    // HMAC accepts keys of any length, so this cannot fail
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation according to RFC 4226
    let offset = (digest[19] & 0x0f) as usize;
    let truncated = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    let modulus = 10u64.checked_pow(digits).unwrap_or(u64::MAX);
    format!(
        "{:0width$}",
        u64::from(truncated) % modulus,
        width = digits as usize
    )
}

/// Generate the code for a Base32 secret at a given Unix timestamp
pub fn code_at(secret_b32: &str, timestamp: u64, params: &TotpParams) -> String {
    let secret = base32::decode(secret_b32);
    generate_code(
        &secret,
        time_step(timestamp, params.period),
        params.digits,
    )
}

/// Seconds remaining before the code for `timestamp` rolls over
pub fn seconds_until_refresh(timestamp: u64, period: u64) -> u64 {
    let period = period.max(1);
    period - (timestamp % period)
}

/// Verify a candidate code against the time source's current time
///
/// The candidate is trimmed of surrounding whitespace and compared
/// digit-for-digit against every step in the window. Returns `false` for
/// any mismatch, including empty or malformed candidates.
pub fn verify<T: TimeSource + ?Sized>(
    secret_b32: &str,
    candidate: &str,
    clock: &T,
    params: &TotpParams,
) -> bool {
    verify_at(secret_b32, candidate, clock.now_unix(), params)
}

/// Verify a candidate code at an explicit Unix timestamp
pub fn verify_at(secret_b32: &str, candidate: &str, timestamp: u64, params: &TotpParams) -> bool {
    matching_offset(secret_b32, candidate, timestamp, params).is_some()
}

/// Find the window offset whose code matches the candidate
///
/// Offsets are checked from the oldest step to the newest; steps before the
/// epoch are skipped. `Some(0)` means the current step matched, negative
/// values mean the client clock is behind.
pub fn matching_offset(
    secret_b32: &str,
    candidate: &str,
    timestamp: u64,
    params: &TotpParams,
) -> Option<i64> {
    let secret = base32::decode(secret_b32);
    let candidate = candidate.trim();
    let current = time_step(timestamp, params.period);
    let window = i64::from(params.window);

    (-window..=window).find(|&offset| {
        let Some(step) = current.checked_add_signed(offset) else {
            return false;
        };
        let expected = generate_code(&secret, step, params.digits);
        expected.as_bytes().ct_eq(candidate.as_bytes()).into()
    })
}
