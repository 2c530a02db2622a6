use std::fmt;

/// Errors that can occur when parsing, generating or inspecting ULIDs.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Error {
    /// The string is too short.
    TooShort,
    /// The string is too long.
    TooLong,
    /// The string contains a character outside the Crockford base32 alphabet.
    InvalidChar,
    /// The string encodes a value larger than 128 bits.
    ValueOverflow,
    /// The given randomness is larger than 80 bits.
    RandomnessOutOfRange,
    /// The key does not decode to a timestamp and a random value.
    InvalidKey,
    /// The random value of a key is zero.
    InvalidZero,
    /// The timestamp cannot be represented.
    TimestampOutOfRange,
    /// All random values of one millisecond are used up.
    MonotonicOverflow,
    /// The input is empty.
    EmptyInput,
    /// Not a single entry of the collection is a valid ULID.
    NoValidEntries,
    /// The entropy source did not deliver random bytes.
    EntropyUnavailable,
    /// The clock did not deliver a timestamp.
    ClockUnavailable,
    /// The key encoder failed.
    EncodingFailed,
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied malformed data.
    Format,
    /// A structurally valid value lies outside the representable time range.
    Range,
    /// Monotonic generation ran out of values within one millisecond.
    Overflow,
    /// Nothing usable was supplied.
    EmptyInput,
    /// An entropy source, clock or encoder failed.
    Source,
}

impl Error {
    /// Returns the kind of this error.
    ///
    /// # Example
    ///
    /// ```
    /// use sortid::{Error, ErrorKind};
    ///
    /// assert_eq!(Error::InvalidChar.kind(), ErrorKind::Format);
    /// assert_eq!(Error::MonotonicOverflow.kind(), ErrorKind::Overflow);
    /// ```
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::TooShort
            | Self::TooLong
            | Self::InvalidChar
            | Self::ValueOverflow
            | Self::RandomnessOutOfRange
            | Self::InvalidKey
            | Self::InvalidZero => ErrorKind::Format,
            Self::TimestampOutOfRange => ErrorKind::Range,
            Self::MonotonicOverflow => ErrorKind::Overflow,
            Self::EmptyInput | Self::NoValidEntries => ErrorKind::EmptyInput,
            Self::EntropyUnavailable | Self::ClockUnavailable | Self::EncodingFailed => ErrorKind::Source,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match *self {
            Self::TooShort => "string is too short",
            Self::TooLong => "string is too long",
            Self::InvalidChar => "string contains an invalid character",
            Self::ValueOverflow => "string encodes a value larger than 128 bits",
            Self::RandomnessOutOfRange => "randomness is too large",
            Self::InvalidKey => "key does not contain a timestamp and a random value",
            Self::InvalidZero => "invalid zero value",
            Self::TimestampOutOfRange => "timestamp is out of range",
            Self::MonotonicOverflow => "randomness exhausted within one millisecond",
            Self::EmptyInput => "input is empty",
            Self::NoValidEntries => "no valid ULIDs found",
            Self::EntropyUnavailable => "entropy source is unavailable",
            Self::ClockUnavailable => "clock is unavailable",
            Self::EncodingFailed => "key encoding failed",
        };
        write!(f, "{message}")
    }
}
