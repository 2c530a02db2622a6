//! # Sortable Identifiers
//!
//! This crate generates, validates, compares and analyzes ULIDs (Universally Unique
//! Lexicographically Sortable Identifiers): 128-bit values made of a 48-bit millisecond
//! timestamp and 80 bits of randomness, written as 26 characters of Crockford base32.
//! ULIDs sort the same way as text, as bytes and as numbers, which is chronological order.
//!
//! ## Generating ULIDs
//!
//! The quickest way is [`Ulid::generate()`], which uses a process-wide monotonic generator:
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use sortid::Ulid;
//!
//! let u = Ulid::generate()?;
//!
//! println!("Generated ULID: {u}");
//! # Ok(()) }
//! ```
//!
//! For control over entropy, clock and monotonicity, create a [`Generator`]:
//!
//! - [`Generator::new()`]: fast, monotonic, for high-throughput identifiers.
//! - [`Generator::secure()`]: randomness from the operating system, for identifiers that
//!   must not be predictable.
//! - [`Generator::builder()`]: any [`EntropySource`] and [`Clock`].
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::time::{Duration, SystemTime};
//! use sortid::Generator;
//!
//! let generator = Generator::new();
//!
//! let batch = generator.generate_batch(10)?;
//!
//! let end = SystemTime::now();
//! let start = end - Duration::from_secs(60 * 60);
//! let spread = generator.generate_range(start, end, 4)?;
//!
//! assert_eq!(batch.len(), 10);
//! assert_eq!(spread.len(), 4);
//! # Ok(()) }
//! ```
//!
//! ## Working with ULID strings
//!
//! ULIDs usually travel as strings. The crate-level functions work on them directly:
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::time::Duration;
//!
//! // cspell:disable-next-line
//! let id = "01jb05jv6h9za2yq6x3k1dagva";
//!
//! assert!(sortid::is_valid(id));
//! // cspell:disable-next-line
//! assert_eq!(sortid::validate_and_normalize(id)?, "01JB05JV6H9ZA2YQ6X3K1DAGVA");
//!
//! let created = sortid::extract_timestamp(id)?;
//! let expired = sortid::is_expired(id, Duration::from_secs(60))?;
//!
//! assert_eq!(sortid::to_uuid(id)?, "0192c059-6cd1-4fd4-2f5c-dd1cc2d5436a");
//! # Ok(()) }
//! ```
//!
//! Collections of ULID strings can be analyzed, filtered and sorted with [`analyze()`],
//! [`filter_by_time_range()`], [`sort_chronologically()`] and
//! [`sort_chronologically_descending()`]. These skip entries that are not valid ULIDs.
//!
//! ## Feature Flags
//!
//! - **`rand`**: Utilizes the `rand` crate as the source for random numbers, enabled by default.
//!   Without it, generators need an explicit [`EntropySource`].
//! - **`serde`**: Provides support for serialization and deserialization via `Serde`, optional.
//!

mod base32;
mod collection;
mod compare;
mod convert;
mod error;
mod generator;
mod keygen;
#[cfg(feature = "serde")]
mod serde;
mod ulid;
mod util;

use std::borrow::Cow;

pub use collection::{analyze, filter_by_time_range, sort_chronologically, sort_chronologically_descending, Stats};
pub use compare::{age, compare, extract_timestamp, is_after, is_before, is_expired};
pub use convert::{from_bytes, to_bytes, to_uuid};
pub use error::{Error, ErrorKind};
#[cfg(feature = "rand")]
pub use generator::RngSource;
pub use generator::{Builder, Clock, EntropySource, Generator, SystemClock};
pub use keygen::{Base32Codec, KeyCodec, KeyGen};
pub use ulid::Ulid;

const RANDOM_BITS: u32 = 80;
const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;

const TIMESTAMP_BITS: u32 = 48;
const TIMESTAMP_MAX: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Checks a ULID string for validity.
///
/// To be valid, a ULID must have the correct length (26), contain only characters of the
/// Crockford base32 alphabet (in any case) and not encode more than 128 bits.
///
/// # Errors
///
/// If the ULID string is not valid, an appropriate error is returned.
///
/// # Example
///
/// ```
/// use sortid::Error;
///
/// // cspell:disable-next-line
/// assert!(sortid::validate("01jb05jv6h9za2yq6x3k1dagva").is_ok());
/// assert!(sortid::validate("7ZZZZZZZZZZZZZZZZZZZZZZZZZ").is_ok());
///
/// assert_eq!(sortid::validate("80000000000000000000000000"), Err(Error::ValueOverflow));
/// assert_eq!(sortid::validate("0000000000000000000000000U"), Err(Error::InvalidChar));
/// assert_eq!(sortid::validate("xxxxxxxxxxxxxxxxxxxxxx"), Err(Error::TooShort));
/// assert_eq!(sortid::validate("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"), Err(Error::TooLong));
/// ```
pub fn validate(ulid: &str) -> Result<(), Error> {
    let buffer: &[u8; 26] = util::as_array(ulid.as_bytes())?;
    base32::validate(buffer)
}

/// Tests if a string is a valid ULID.
///
/// # Example
///
/// ```
/// assert!(sortid::is_valid("01ARZ3NDEKTSV4RRFFQ69G5FAV")); // cspell:disable-line
///
/// assert!(!sortid::is_valid(""));
/// assert!(!sortid::is_valid("invalid"));
/// ```
#[must_use]
pub fn is_valid(ulid: &str) -> bool {
    validate(ulid).is_ok()
}

/// Validates a ULID string and converts it into its canonical uppercase form.
///
/// If the input is already canonical, it is returned borrowed without allocating.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty string, and the error of [`validate()`]
/// for any other invalid string.
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
///
/// let s = "01arz3ndektsv4rrffq69g5fav"; // cspell:disable-line
///
/// assert_eq!(sortid::validate_and_normalize(s), Ok("01ARZ3NDEKTSV4RRFFQ69G5FAV".into())); // cspell:disable-line
/// assert!(matches!(sortid::validate_and_normalize("01ARZ3NDEKTSV4RRFFQ69G5FAV"), Ok(Cow::Borrowed(_)))); // cspell:disable-line
/// assert_eq!(sortid::validate_and_normalize(""), Err(sortid::Error::EmptyInput));
/// ```
pub fn validate_and_normalize(ulid: &str) -> Result<Cow<'_, str>, Error> {
    if ulid.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut buffer = *util::as_array::<26>(ulid.as_bytes())?;
    let canonical = base32::canonicalize(&mut buffer)?;

    if canonical == ulid {
        Ok(ulid.into())
    } else {
        Ok(canonical.to_string().into())
    }
}
