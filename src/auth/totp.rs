//! Time-based one-time passwords (RFC 6238, HMAC-SHA1, 30 second step,
//! 6 digits) with base32 encoded secrets.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const STEP_SECS: u64 = 30;
pub const DIGITS: u32 = 6;

/// Decode an RFC 4648 base32 string. Padding, spaces and case are ignored.
pub fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0u32;

    for c in input.chars().filter(|c| !c.is_whitespace() && *c != '=' && *c != '-') {
        let value = match c.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as u64 - 'A' as u64,
            c @ '2'..='7' => c as u64 - '2' as u64 + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Some(out)
}

/// HOTP value (RFC 4226) truncated to `DIGITS`.
pub fn hotp(key: &[u8], counter: u64) -> Option<u32> {
    let mut mac = HmacSha1::new_from_slice(key).ok()?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    Some(binary % 10u32.pow(DIGITS))
}

/// Check `code` against the base32 `secret` at `unix_time`, accepting
/// `window` steps of drift either side.
pub fn verify(secret: &str, code: &str, unix_time: u64, window: u32) -> bool {
    let code = code.trim();
    if code.len() != DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Some(key) = decode_base32(secret).filter(|k| !k.is_empty()) else {
        return false;
    };

    let current = unix_time / STEP_SECS;
    let window = u64::from(window);
    let first = current.saturating_sub(window);
    (first..=current + window).any(|counter| {
        hotp(&key, counter)
            .map(|value| format!("{:0width$}", value, width = DIGITS as usize) == code)
            .unwrap_or(false)
    })
}
