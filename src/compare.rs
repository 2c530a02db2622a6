//! Ordering and time queries on ULID strings.
//!
//! All functions accept ULIDs in text form (any case) and fail with a format error
//! when a string is not a valid ULID.

use std::{
    cmp::Ordering,
    time::{Duration, SystemTime},
};

use crate::{Error, Ulid};

/// Compares two ULID strings chronologically.
///
/// The order is the order of the underlying 128-bit values: timestamp first, randomness second.
/// It equals the order of the canonical strings.
///
/// # Errors
///
/// Fails if either string is not a valid ULID.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
///
/// let a = "01ARZ3NDEKTSV4RRFFQ69G5FAV"; // cspell:disable-line
/// let b = "01BX5ZZKBKACTAV9WEVGEMMVRZ"; // cspell:disable-line
///
/// assert_eq!(sortid::compare(a, b), Ok(Ordering::Less));
/// assert_eq!(sortid::compare(b, &b.to_lowercase()), Ok(Ordering::Equal));
/// assert!(sortid::compare(a, "invalid").is_err());
/// ```
pub fn compare(a: &str, b: &str) -> Result<Ordering, Error> {
    let a: Ulid = a.parse()?;
    let b: Ulid = b.parse()?;
    Ok(a.cmp(&b))
}

/// Tests if ULID `a` sorts before ULID `b`.
///
/// # Errors
///
/// Fails if either string is not a valid ULID.
pub fn is_before(a: &str, b: &str) -> Result<bool, Error> {
    compare(a, b).map(Ordering::is_lt)
}

/// Tests if ULID `a` sorts after ULID `b`.
///
/// # Errors
///
/// Fails if either string is not a valid ULID.
pub fn is_after(a: &str, b: &str) -> Result<bool, Error> {
    compare(a, b).map(Ordering::is_gt)
}

/// Extracts the timestamp of a ULID string.
///
/// # Errors
///
/// Fails with a format error if the string is not a valid ULID, and with
/// [`Error::TimestampOutOfRange`] if the timestamp cannot be represented as a [`SystemTime`].
///
/// # Example
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// let time = sortid::extract_timestamp("01ARZ3NDEKTSV4RRFFQ69G5FAV").unwrap(); // cspell:disable-line
///
/// assert_eq!(time, SystemTime::UNIX_EPOCH + Duration::from_millis(1_469_922_850_259));
/// ```
pub fn extract_timestamp(ulid: &str) -> Result<SystemTime, Error> {
    ulid.parse::<Ulid>()?.datetime()
}

/// Returns the age of a ULID string, measured from its timestamp until now.
///
/// ULIDs with a timestamp in the future have an age of zero.
///
/// # Errors
///
/// Fails like [`extract_timestamp()`].
pub fn age(ulid: &str) -> Result<Duration, Error> {
    ulid.parse::<Ulid>()?.age()
}

/// Tests if a ULID string is older than `max_age`.
///
/// # Errors
///
/// Fails like [`extract_timestamp()`].
pub fn is_expired(ulid: &str, max_age: Duration) -> Result<bool, Error> {
    ulid.parse::<Ulid>()?.is_expired(max_age)
}
