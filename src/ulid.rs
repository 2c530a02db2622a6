use std::{
    fmt,
    str::FromStr,
    time::{Duration, SystemTime},
};

use crate::{base32, generator, util, Error, RANDOM_BITS, RANDOM_MASK};

/// A Universally Unique Lexicographically Sortable Identifier.
///
/// A `Ulid` is a 128-bit value: a 48-bit timestamp (milliseconds since the Unix epoch)
/// followed by 80 bits of randomness. Its canonical text form is 26 characters of
/// Crockford base32, and the ordering of `Ulid` values, of their text form and of
/// their binary form are all the same.
///
/// Every 128-bit value is a valid `Ulid`, including zero ([`Ulid::NIL`]).
///
/// # Example
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use sortid::Ulid;
///
// cspell:disable-next-line
/// let u: Ulid = "01JB05JV6H9ZA2YQ6X3K1DAGVA".parse()?;
///
/// assert_eq!(u.timestamp(), 1_729_803_939_025);
// cspell:disable-next-line
/// assert_eq!(u.to_string(), "01JB05JV6H9ZA2YQ6X3K1DAGVA");
/// # Ok(()) }
/// ```
#[derive(Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Ulid(u128);

impl Ulid {
    /// The zero `Ulid`, `"00000000000000000000000000"`.
    pub const NIL: Self = Self(0);

    /// The largest `Ulid`, `"7ZZZZZZZZZZZZZZZZZZZZZZZZZ"`.
    pub const MAX: Self = Self(u128::MAX);

    /// Generates a new `Ulid` with the process-wide default generator.
    ///
    /// The default generator is monotonic: ULIDs generated within the same millisecond
    /// are strictly increasing.
    ///
    /// # Errors
    ///
    /// Fails if the system clock is outside the ULID time range, if no entropy source is
    /// available (the `rand` feature is disabled), or in the practically unreachable case that
    /// all 2<sup>80</sup> random values of one millisecond have been handed out.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use sortid::Ulid;
    ///
    /// let u1 = Ulid::generate()?;
    /// let u2 = Ulid::generate()?;
    ///
    /// assert!(u1 < u2);
    /// # Ok(()) }
    /// ```
    pub fn generate() -> Result<Self, Error> {
        generator::default_generator().generate()
    }

    /// Generates a new `Ulid` with the given time using the process-wide default generator.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TimestampOutOfRange`] if `time` is before the Unix epoch or beyond
    /// the 48-bit millisecond range, and otherwise like [`Ulid::generate()`].
    pub fn generate_with_time(time: SystemTime) -> Result<Self, Error> {
        generator::default_generator().generate_with_time(time)
    }

    /// Tests if this is the zero `Ulid`.
    #[must_use]
    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Returns the timestamp part, in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(self) -> u64 {
        (self.0 >> RANDOM_BITS) as u64
    }

    /// Returns the random part, limited to 80 bits.
    #[must_use]
    pub const fn randomness(self) -> u128 {
        self.0 & RANDOM_MASK
    }

    /// Returns the timestamp part as a [`SystemTime`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOutOfRange`] if the timestamp cannot be represented
    /// as a [`SystemTime`] on this platform.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    /// use sortid::Ulid;
    ///
    /// let u = Ulid::from_parts(1_000, 42).unwrap();
    ///
    /// assert_eq!(u.datetime(), Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(1)));
    /// ```
    pub fn datetime(self) -> Result<SystemTime, Error> {
        util::datetime(self.timestamp())
    }

    /// Returns how much time has passed between the timestamp of this `Ulid` and now.
    ///
    /// A `Ulid` with a timestamp in the future has an age of zero.
    ///
    /// # Errors
    ///
    /// Fails like [`Ulid::datetime()`].
    pub fn age(self) -> Result<Duration, Error> {
        self.age_at(SystemTime::now())
    }

    /// Returns how much time has passed between the timestamp of this `Ulid` and `now`.
    ///
    /// # Errors
    ///
    /// Fails like [`Ulid::datetime()`].
    pub fn age_at(self, now: SystemTime) -> Result<Duration, Error> {
        Ok(now.duration_since(self.datetime()?).unwrap_or_default())
    }

    /// Tests if this `Ulid` is older than `max_age`.
    ///
    /// # Errors
    ///
    /// Fails like [`Ulid::datetime()`].
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use std::time::{Duration, SystemTime};
    /// use sortid::Ulid;
    ///
    /// const HOUR: Duration = Duration::from_secs(60 * 60);
    ///
    /// let old = Ulid::generate_with_time(SystemTime::now() - 2 * HOUR)?;
    ///
    /// assert!(old.is_expired(HOUR)?);
    /// # Ok(()) }
    /// ```
    pub fn is_expired(self, max_age: Duration) -> Result<bool, Error> {
        Ok(self.age()? > max_age)
    }

    /// Returns the timestamp and randomness parts as a pair.
    #[must_use]
    pub const fn to_parts(self) -> (u64, u128) {
        (self.timestamp(), self.randomness())
    }

    /// Creates a `Ulid` from a timestamp and randomness parts.
    ///
    /// # Errors
    ///
    /// Fails if the timestamp exceeds 48 bits or the randomness exceeds 80 bits.
    ///
    /// # Example
    ///
    /// ```
    /// use sortid::{Error, Ulid};
    ///
    /// let u = Ulid::from_parts(1, 2).unwrap();
    /// assert_eq!(u.to_parts(), (1, 2));
    ///
    /// assert_eq!(Ulid::from_parts(1 << 48, 0), Err(Error::TimestampOutOfRange));
    /// ```
    pub const fn from_parts(timestamp: u64, randomness: u128) -> Result<Self, Error> {
        match util::from_parts(timestamp, randomness) {
            Ok(n) => Ok(Self(n)),
            Err(error) => Err(error),
        }
    }

    /// Converts a `Ulid` into its 16 byte binary form.
    ///
    /// The bytes are in network byte order (big endian): six bytes of timestamp
    /// followed by ten bytes of randomness.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use sortid::Ulid;
    ///
    // cspell:disable-next-line
    /// let ulid: Ulid = "01JB05JV6H9ZA2YQ6X3K1DAGVA".parse()?;
    ///
    /// assert_eq!(ulid.to_bytes(), [1, 146, 192, 89, 108, 209, 79, 212, 47, 92, 221, 28, 194, 213, 67, 106]);
    /// # Ok(()) }
    /// ```
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Creates a `Ulid` from its 16 byte binary form.
    ///
    /// Every byte sequence is a valid `Ulid`.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    /// Converts a `Ulid` into a `u128` integer.
    #[must_use]
    pub const fn to_u128(self) -> u128 {
        self.0
    }

    /// Creates a `Ulid` from a `u128` integer.
    #[must_use]
    pub const fn from_u128(n: u128) -> Self {
        Self(n)
    }

    /// Renders the 16 bytes of this `Ulid` in the hyphenated UUID layout.
    ///
    /// The result has the shape `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` in lowercase hex.
    ///
    /// This only relabels the bytes. The UUID version and variant bits are **not** set,
    /// so the result is generally not a valid RFC 4122 UUID. It is meant for display and
    /// for storage in UUID typed columns; converting it back yields the same `Ulid`.
    ///
    /// # Example
    ///
    /// ```
    /// use sortid::Ulid;
    ///
    /// let u = Ulid::from_u128(0x0192_c059_6cd1_4fd4_2f5c_dd1c_c2d5_436a);
    ///
    /// assert_eq!(u.to_uuid(), "0192c059-6cd1-4fd4-2f5c-dd1cc2d5436a");
    /// ```
    #[must_use]
    pub fn to_uuid(self) -> String {
        let n = self.0;
        format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            n >> 96,
            (n >> 80) & 0xFFFF,
            (n >> 64) & 0xFFFF,
            (n >> 48) & 0xFFFF,
            n & 0xFFFF_FFFF_FFFF,
        )
    }
}

impl fmt::Debug for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        util::debug_ulid("Ulid", self.0, f)
    }
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = [0; 26];
        f.write_str(base32::encode(self.0, &mut buffer))
    }
}

impl FromStr for Ulid {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let buffer: &[u8; 26] = util::as_array(s.as_bytes())?;
        Ok(Self(base32::decode(buffer)?))
    }
}

impl From<Ulid> for u128 {
    fn from(ulid: Ulid) -> Self {
        ulid.to_u128()
    }
}

impl From<u128> for Ulid {
    fn from(n: u128) -> Self {
        Self::from_u128(n)
    }
}

impl From<Ulid> for [u8; 16] {
    fn from(ulid: Ulid) -> Self {
        ulid.to_bytes()
    }
}

impl From<[u8; 16]> for Ulid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<&[u8]> for Ulid {
    type Error = Error;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self::from_bytes(*util::as_array(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let u = Ulid::from_parts(0x0123_4567_89AB, 0x0011_2233_4455_6677_8899).unwrap();
        assert_eq!(u.timestamp(), 0x0123_4567_89AB);
        assert_eq!(u.randomness(), 0x0011_2233_4455_6677_8899);
        assert_eq!(
            u.to_bytes(),
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99]
        );
    }

    #[test]
    fn test_bytes_round_trip() {
        let bytes = [0xFF; 16];
        assert_eq!(Ulid::from_bytes(bytes).to_bytes(), bytes);
        assert_eq!(Ulid::from_bytes(bytes), Ulid::MAX);

        assert_eq!(Ulid::try_from(&[0u8; 16][..]), Ok(Ulid::NIL));
        assert_eq!(Ulid::try_from(&[0u8; 15][..]), Err(Error::TooShort));
        assert_eq!(Ulid::try_from(&[0u8; 17][..]), Err(Error::TooLong));
    }

    #[test]
    fn test_nil() {
        let nil: Ulid = "00000000000000000000000000".parse().unwrap();
        assert!(nil.is_nil());
        assert_eq!(nil, Ulid::default());
        assert_eq!(nil.datetime(), Ok(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn test_uuid_layout() {
        assert_eq!(Ulid::NIL.to_uuid(), "00000000-0000-0000-0000-000000000000");
        assert_eq!(Ulid::MAX.to_uuid(), "ffffffff-ffff-ffff-ffff-ffffffffffff");

        let uuid = Ulid::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]).to_uuid();
        assert_eq!(uuid, "00010203-0405-0607-0809-0a0b0c0d0e0f");
        assert_eq!(uuid.len(), 36);
    }

    #[test]
    fn test_age_at() {
        let u = Ulid::from_parts(10_000, 0).unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(70);
        assert_eq!(u.age_at(now), Ok(Duration::from_secs(60)));

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(5);
        assert_eq!(u.age_at(past), Ok(Duration::ZERO));
    }
}
