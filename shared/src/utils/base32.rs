//! Base32 (RFC 4648) codec for TOTP secrets
//!
//! Authenticator apps exchange shared secrets as upper-case Base32 text with
//! `=` padding. Encoding always produces canonical padded output; decoding is
//! lenient (see [`decode`]).

/// RFC 4648 Base32 alphabet
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Padding character appended until the output length is a multiple of 8
pub const PADDING: char = '=';

/// Encode bytes as padded upper-case Base32
///
/// Bits are consumed most-significant first. A trailing group shorter than
/// five bits is right-padded with zero bits, then `=` is appended until the
/// output length is a multiple of 8. Never fails; empty input encodes to an
/// empty string.
///
/// # Example
/// ```
/// use eventdesk_shared::utils::base32;
///
/// assert_eq!(base32::encode(b"foobar"), "MZXW6YTBOI======");
/// ```
pub fn encode(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len().div_ceil(5) * 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for &byte in input {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            output.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        output.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    while output.len() % 8 != 0 {
        output.push(PADDING);
    }

    output
}

/// Decode Base32 text into bytes
///
/// Input is case-insensitive and trailing `=` padding is trimmed.
///
/// NOTE: this decoder is deliberately lenient and is not a strict RFC 4648
/// decoder. Characters outside the alphabet (spaces, dashes, stray `=`) are
/// skipped rather than rejected, and a trailing group of fewer than 8 bits is
/// dropped. Callers that need strict validation must check the text first.
pub fn decode(input: &str) -> Vec<u8> {
    let trimmed = input.trim_end_matches(PADDING);
    let mut output = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for c in trimmed.chars() {
        let Some(value) = symbol_value(c) else {
            continue;
        };

        buffer = (buffer << 5) | value;
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            output.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    output
}

/// Check whether text is strictly valid Base32 for a TOTP secret
///
/// Spaces are ignored and letters may be lower case, but every other
/// character must belong to the alphabet and padding may only appear at the
/// end. Empty input is rejected.
pub fn is_valid(input: &str) -> bool {
    let compact: String = input.chars().filter(|c| *c != ' ').collect();
    let body = compact.trim_end_matches(PADDING);

    !body.is_empty() && body.chars().all(|c| symbol_value(c).is_some())
}

/// Canonical stored form of a secret: upper case, no spaces or padding
///
/// Decodes to the same bytes as the input for any text [`is_valid`] accepts.
pub fn normalize_secret(secret: &str) -> String {
    secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != PADDING)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Format a Base32 secret for display (groups of 4 characters)
///
/// Padding and spaces are stripped and letters upper-cased, which keeps the
/// secret easy to type into an authenticator app by hand.
pub fn format_secret(secret: &str) -> String {
    normalize_secret(secret)
        .chars()
        .enumerate()
        .fold(String::new(), |mut acc, (i, c)| {
            if i > 0 && i % 4 == 0 {
                acc.push(' ');
            }
            acc.push(c);
            acc
        })
}

fn symbol_value(c: char) -> Option<u32> {
    match c.to_ascii_uppercase() {
        c @ 'A'..='Z' => Some(c as u32 - 'A' as u32),
        c @ '2'..='7' => Some(c as u32 - '2' as u32 + 26),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4648_vectors() {
        let vectors: [(&[u8], &str); 7] = [
            (b"", ""),
            (b"f", "MY======"),
            (b"fo", "MZXQ===="),
            (b"foo", "MZXW6==="),
            (b"foob", "MZXW6YQ="),
            (b"fooba", "MZXW6YTB"),
            (b"foobar", "MZXW6YTBOI======"),
        ];

        for (raw, encoded) in vectors {
            assert_eq!(encode(raw), encoded, "encoding {:?}", raw);
            assert_eq!(decode(encoded), raw, "decoding {}", encoded);
        }
    }

    #[test]
    fn test_rfc6238_secret_encoding() {
        assert_eq!(
            encode(b"12345678901234567890"),
            "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ"
        );
    }

    #[test]
    fn test_round_trip_and_padding_for_all_short_lengths() {
        for len in 0..=40usize {
            let data: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            let encoded = encode(&data);
            assert_eq!(encoded.len() % 8, 0, "length {} not padded", len);
            assert_eq!(decode(&encoded), data, "round trip failed for {}", len);
        }
    }

    #[test]
    fn test_round_trip_extreme_bytes() {
        let data = [0x00, 0xff, 0x80, 0x01, 0x7f, 0xfe, 0x00];
        assert_eq!(decode(&encode(&data)), data);
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode("mzxw6ytboi======"), b"foobar");
        assert_eq!(decode("MzXw6YtBoI"), b"foobar");
    }

    #[test]
    fn test_decode_skips_unknown_characters() {
        assert_eq!(decode("MZXW 6YTB-OI"), b"foobar");
        assert_eq!(decode("MZ!XW6@YTB"), b"fooba");
        assert_eq!(decode("1089"), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_drops_incomplete_trailing_bits() {
        // 3 symbols = 15 bits: one full byte, 7 bits discarded
        assert_eq!(decode("MZX"), b"f");
        assert_eq!(decode("M"), Vec::<u8>::new());
        assert_eq!(decode(""), Vec::<u8>::new());
        assert_eq!(decode("========"), Vec::<u8>::new());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("JBSWY3DPEHPK3PXP"));
        assert!(is_valid("jbswy3dpehpk3pxp"));
        assert!(is_valid("JBSW Y3DP EHPK 3PXP"));
        assert!(is_valid("MZXW6==="));
        assert!(!is_valid(""));
        assert!(!is_valid("===="));
        assert!(!is_valid("invalid!@#"));
        assert!(!is_valid("123456"));
        assert!(!is_valid("MZ=XW6"));
    }

    #[test]
    fn test_normalize_secret() {
        assert_eq!(normalize_secret("jbsw y3dp EHPK 3pxp"), "JBSWY3DPEHPK3PXP");
        assert_eq!(normalize_secret(" MZXW6===\n"), "MZXW6");
        assert_eq!(
            decode(&normalize_secret(&format_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ"))),
            b"12345678901234567890"
        );
    }

    #[test]
    fn test_format_secret() {
        assert_eq!(format_secret("JBSWY3DPEHPK3PXP"), "JBSW Y3DP EHPK 3PXP");
        assert_eq!(format_secret("jbswy3dpehpk3pxp"), "JBSW Y3DP EHPK 3PXP");
        assert_eq!(format_secret("MZXW6==="), "MZXW 6");
        assert_eq!(format_secret("JBSW Y3DP"), "JBSW Y3DP");
    }
}
