//! Conversions of ULID strings into other representations.

use crate::{Error, Ulid};

/// Converts a ULID string into its 16 byte binary form.
///
/// # Errors
///
/// Fails if the string is not a valid ULID.
///
/// # Example
///
/// ```
/// let bytes = sortid::to_bytes("01JB05JV6H9ZA2YQ6X3K1DAGVA").unwrap(); // cspell:disable-line
///
/// assert_eq!(bytes, [1, 146, 192, 89, 108, 209, 79, 212, 47, 92, 221, 28, 194, 213, 67, 106]);
/// ```
pub fn to_bytes(ulid: &str) -> Result<[u8; 16], Error> {
    Ok(ulid.parse::<Ulid>()?.to_bytes())
}

/// Converts a 16 byte binary ULID into its canonical string.
///
/// Every byte sequence is a valid ULID, so this never fails.
#[must_use]
pub fn from_bytes(bytes: [u8; 16]) -> String {
    Ulid::from_bytes(bytes).to_string()
}

/// Renders a ULID string in the hyphenated UUID layout.
///
/// See [`Ulid::to_uuid()`]: the bytes are relabelled as-is, no UUID version or variant
/// bits are set.
///
/// # Errors
///
/// Fails if the string is not a valid ULID.
///
/// # Example
///
/// ```
/// let uuid = sortid::to_uuid("01JB05JV6H9ZA2YQ6X3K1DAGVA").unwrap(); // cspell:disable-line
///
/// assert_eq!(uuid, "0192c059-6cd1-4fd4-2f5c-dd1cc2d5436a");
/// ```
pub fn to_uuid(ulid: &str) -> Result<String, Error> {
    Ok(ulid.parse::<Ulid>()?.to_uuid())
}
