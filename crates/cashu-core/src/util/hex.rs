//! Minimal hex encode/decode helpers
//!
//! Secrets, keys and DLEQ components are all hex strings on the wire; this
//! avoids pulling in a dedicated hex crate for what is a few lines of code.

use thiserror::Error;

/// Hex Error
#[derive(Debug, Error)]
pub enum Error {
    /// Odd number of hex digits
    #[error("odd number of hex digits")]
    OddLength,
    /// Invalid hex digit
    #[error("invalid hex digit: {0}")]
    InvalidDigit(char),
}

/// Encode bytes as a lowercase hex string
pub fn encode<T: AsRef<[u8]>>(data: T) -> String {
    let bytes = data.as_ref();
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

/// Decode a hex string into bytes
pub fn decode<T: AsRef<str>>(data: T) -> Result<Vec<u8>, Error> {
    let s = data.as_ref();
    if s.len() % 2 != 0 {
        return Err(Error::OddLength);
    }

    let digit = |c: char| -> Result<u8, Error> {
        c.to_digit(16).map(|d| d as u8).ok_or(Error::InvalidDigit(c))
    };

    s.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = digit(pair[0] as char)?;
            let lo = digit(pair[1] as char)?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let bytes = [0x00, 0x01, 0xab, 0xff];
        let encoded = encode(bytes);
        assert_eq!(encoded, "0001abff");
        assert_eq!(decode(&encoded).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(matches!(decode("abc"), Err(Error::OddLength)));
    }

    #[test]
    fn test_invalid_digit_rejected() {
        assert!(matches!(decode("zz"), Err(Error::InvalidDigit('z'))));
    }
}
