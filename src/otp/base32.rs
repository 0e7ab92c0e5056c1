//! RFC 4648 base32 decoding for provisioned TOTP secrets.
//!
//! Accepts upper- or lowercase, skips `=` padding, spaces and dashes
//! (secrets are often printed in groups).

use crate::error::OtpError;

fn symbol_value(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

/// Decode `input` into `out`, returning the number of bytes written.
///
/// Trailing bits that do not make up a whole byte are dropped.
pub fn decode(input: &str, out: &mut [u8]) -> Result<usize, OtpError> {
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut written = 0;

    for c in input.bytes() {
        if matches!(c, b'=' | b' ' | b'-') {
            continue;
        }
        let value = symbol_value(c).ok_or(OtpError::InvalidSecret)?;

        buffer = (buffer << 5) | u32::from(value);
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            let slot = out.get_mut(written).ok_or(OtpError::SecretTooLong)?;
            *slot = (buffer >> bits) as u8;
            written += 1;
            buffer &= (1 << bits) - 1;
        }
    }

    if written == 0 {
        return Err(OtpError::EmptySecret);
    }
    Ok(written)
}
