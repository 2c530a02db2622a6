use std::str::from_utf8_unchecked;

use crate::Error;

// cspell:disable-next-line
const ALPHABET: [u8; 32] = *b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Encodes the lowest `5 * N` bits of `n` into `buffer`, most significant character first.
pub fn encode<const N: usize>(mut n: u128, buffer: &mut [u8; N]) -> &str {
    for byte in buffer.iter_mut().rev() {
        *byte = ALPHABET[(n & 0x1F) as usize];
        n >>= 5;
    }

    // Safety: Encoding above guarantees valid UTF-8
    unsafe { from_utf8_unchecked(buffer) }
}

/// Decodes `N` characters of Crockford base32, case-insensitive.
///
/// Fails with [`Error::ValueOverflow`] when the characters carry more than 128 bits.
pub fn decode<const N: usize>(ascii_bytes: &[u8; N]) -> Result<u128, Error> {
    let mut n: u128 = 0;

    for &byte in ascii_bytes {
        let value = decode_char(byte)?;
        if n >> 123 != 0 {
            return Err(Error::ValueOverflow);
        }
        n = (n << 5) | value;
    }

    Ok(n)
}

pub fn validate<const N: usize>(ascii_bytes: &[u8; N]) -> Result<(), Error> {
    decode(ascii_bytes).map(|_| ())
}

/// Validates `buffer` and converts it in place into the canonical uppercase form.
pub fn canonicalize<const N: usize>(buffer: &mut [u8; N]) -> Result<&str, Error> {
    validate(buffer)?;
    buffer.make_ascii_uppercase();

    // Safety: Validation above guarantees ASCII only
    Ok(unsafe { from_utf8_unchecked(buffer) })
}

fn decode_char(char: u8) -> Result<u128, Error> {
    #[rustfmt::skip]
    const DECODE: [i8; 256] = [
        /* 0x00 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0x10 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0x20 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0x30 */   0,  1,  2,  3,  4,  5,  6,  7,  8,  9, -1, -1, -1, -1, -1, -1,
        /* 0x40 */  -1, 10, 11, 12, 13, 14, 15, 16, 17, -1, 18, 19, -1, 20, 21, -1,
        /* 0x50 */  22, 23, 24, 25, 26, -1, 27, 28, 29, 30, 31, -1, -1, -1, -1, -1,
        /* 0x60 */  -1, 10, 11, 12, 13, 14, 15, 16, 17, -1, 18, 19, -1, 20, 21, -1,
        /* 0x70 */  22, 23, 24, 25, 26, -1, 27, 28, 29, 30, 31, -1, -1, -1, -1, -1,
        /* 0x80 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0x90 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xA0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xB0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xC0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xD0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xE0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
        /* 0xF0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    ];

    u128::try_from(DECODE[usize::from(char)]).or(Err(Error::InvalidChar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_alphabet_order() {
        let mut buffer = [0; 26];
        assert_eq!(encode(0, &mut buffer), "00000000000000000000000000");
        assert_eq!(encode(31, &mut buffer), "0000000000000000000000000Z");
        assert_eq!(encode(u128::MAX, &mut buffer), "7ZZZZZZZZZZZZZZZZZZZZZZZZZ");
    }

    #[test]
    fn test_decode_rejects_excluded_letters() {
        for c in [b'I', b'L', b'O', b'U', b'i', b'l', b'o', b'u'] {
            let mut buffer = *b"00000000000000000000000000";
            buffer[25] = c;
            assert_eq!(decode(&buffer), Err(Error::InvalidChar));
        }
    }

    #[test]
    fn test_decode_case_insensitive() {
        // cspell:disable-next-line
        assert_eq!(decode(b"01jb05jv6h9za2yq6x3k1dagva"), decode(b"01JB05JV6H9ZA2YQ6X3K1DAGVA"));
    }

    #[test]
    fn test_decode_overflow() {
        assert_eq!(decode(b"7ZZZZZZZZZZZZZZZZZZZZZZZZZ"), Ok(u128::MAX));
        assert_eq!(decode(b"80000000000000000000000000"), Err(Error::ValueOverflow));
        assert_eq!(decode(b"Z0000000000000000000000000"), Err(Error::ValueOverflow));
    }

    #[test]
    fn test_short_widths() {
        let mut buffer = [0; 13];
        let s = encode(u128::from(u64::MAX), &mut buffer).to_string();
        assert_eq!(s, "FZZZZZZZZZZZZ");
        let bytes: &[u8; 13] = s.as_bytes().try_into().unwrap();
        assert_eq!(decode(bytes), Ok(u128::from(u64::MAX)));
    }

    #[test]
    fn test_canonicalize() {
        // cspell:disable-next-line
        let mut buffer = *b"01jb05jv6h9za2yq6x3k1dagva";
        // cspell:disable-next-line
        assert_eq!(canonicalize(&mut buffer), Ok("01JB05JV6H9ZA2YQ6X3K1DAGVA"));

        let mut buffer = *b"0000000000000000000000000u";
        assert_eq!(canonicalize(&mut buffer), Err(Error::InvalidChar));
    }
}
