//! Compact keys built from a timestamp and a random value through a pluggable encoding.
//!
//! A [`KeyGen`] turns the pair `[timestamp, random]` into a key string with a [`KeyCodec`].
//! The codec decides what keys look like; [`Base32Codec`] is the built-in one. Swapping the
//! codec changes the key format without touching the callers of [`KeyGen`].

use std::time::{Duration, SystemTime};

use crate::{base32, util, Error, Generator};

/// An encoding strategy for lists of integers.
pub trait KeyCodec {
    /// Encodes the values into a key.
    ///
    /// # Errors
    ///
    /// Implementations report values they cannot encode.
    fn encode(&self, values: &[u64]) -> Result<String, Error>;

    /// Decodes a key back into its values.
    ///
    /// Keys which were not produced by [`KeyCodec::encode`] decode to an empty vector.
    fn decode(&self, key: &str) -> Vec<u64>;
}

/// Encodes each value as 13 characters of Crockford base32.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base32Codec;

const CHARS_PER_VALUE: usize = 13;

impl KeyCodec for Base32Codec {
    fn encode(&self, values: &[u64]) -> Result<String, Error> {
        let mut key = String::with_capacity(values.len() * CHARS_PER_VALUE);
        let mut buffer = [0; CHARS_PER_VALUE];

        for &value in values {
            key.push_str(base32::encode(u128::from(value), &mut buffer));
        }

        Ok(key)
    }

    fn decode(&self, key: &str) -> Vec<u64> {
        if !key.len().is_multiple_of(CHARS_PER_VALUE) {
            return Vec::new();
        }

        key.as_bytes()
            .chunks_exact(CHARS_PER_VALUE)
            .map(|chunk| {
                let buffer: &[u8; CHARS_PER_VALUE] = util::as_array(chunk)?;
                u64::try_from(base32::decode(buffer)?).map_err(|_| Error::ValueOverflow)
            })
            .collect::<Result<_, Error>>()
            .unwrap_or_default()
    }
}

/// A generator for keys of a timestamp and a non-zero random value.
///
/// # Example
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use sortid::{Base32Codec, KeyGen};
///
/// let keygen = KeyGen::new(Base32Codec);
///
/// let key = keygen.generate()?;
///
/// assert_eq!(key.len(), 26);
/// assert!(keygen.is_key_valid(&key));
/// assert!(!keygen.is_key_valid("abc"));
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct KeyGen<C> {
    codec: C,
    generator: Generator,
}

impl<C: KeyCodec> KeyGen<C> {
    /// Creates a key generator with the given codec and a default generator.
    pub fn new(codec: C) -> Self {
        Self::with_generator(codec, Generator::builder().build())
    }

    /// Creates a key generator with the given codec and generator.
    pub fn with_generator(codec: C, generator: Generator) -> Self {
        Self { codec, generator }
    }

    /// Generates a new key.
    ///
    /// The key encodes the timestamp in milliseconds and the lower 64 bits of a fresh ULID's
    /// randomness, raised to one if they happen to be zero.
    ///
    /// # Errors
    ///
    /// Fails if the generator fails, or with whatever error the codec reports.
    pub fn generate(&self) -> Result<String, Error> {
        let ulid = self.generator.generate()?;
        let random = (ulid.randomness() as u64).max(1);

        self.codec.encode(&[ulid.timestamp(), random])
    }

    /// Validates a key and returns the time it was generated.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] for an empty key; the codec is not consulted.
    /// - [`Error::InvalidKey`] if the key does not decode to exactly two values.
    /// - [`Error::TimestampOutOfRange`] if the timestamp cannot be represented.
    /// - [`Error::InvalidZero`] if the random value is zero.
    pub fn validate_key(&self, key: &str) -> Result<SystemTime, Error> {
        if key.is_empty() {
            return Err(Error::EmptyInput);
        }

        let values = self.codec.decode(key);
        let [timestamp, random] = values[..] else {
            return Err(Error::InvalidKey);
        };

        if i64::try_from(timestamp).is_err() {
            return Err(Error::TimestampOutOfRange);
        }
        if random == 0 {
            return Err(Error::InvalidZero);
        }

        SystemTime::UNIX_EPOCH
            .checked_add(Duration::from_millis(timestamp))
            .ok_or(Error::TimestampOutOfRange)
    }

    /// Tests if a key is valid.
    pub fn is_key_valid(&self, key: &str) -> bool {
        self.validate_key(key).is_ok()
    }
}
