use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
    time::{Duration, SystemTime},
};

#[cfg(feature = "rand")]
use rand::{
    rngs::{OsRng, SmallRng},
    RngCore, SeedableRng as _,
};

use crate::{util, Error, Ulid, RANDOM_MASK, TIMESTAMP_MAX};

/// Trait for entropy sources.
///
/// An entropy source delivers the 80 random bits of each generated ULID.
/// With the `rand` feature, any [`rand::RngCore`] can be used through the `RngSource` adapter.
///
/// # Example
///
/// ```
/// use sortid::{EntropySource, Generator};
///
/// struct Counter(u8);
///
/// impl EntropySource for Counter {
///     fn random_bytes(&mut self) -> Option<[u8; 10]> {
///         self.0 = self.0.checked_add(1)?;
///         Some([self.0; 10])
///     }
/// }
///
/// let generator = Generator::builder().entropy(Counter(0)).build();
///
/// assert_eq!(generator.generate().unwrap().randomness(), 0x0101_0101_0101_0101_0101);
/// ```
pub trait EntropySource: Send {
    /// Returns ten random bytes, or `None` if the source cannot deliver.
    fn random_bytes(&mut self) -> Option<[u8; 10]>;
}

/// Trait for clocks.
pub trait Clock: Send {
    /// Returns the current timestamp in milliseconds since the Unix epoch.
    fn timestamp(&mut self) -> Option<u64>;
}

/// An adapter that implements [`EntropySource`] for [`RngCore`] types.
#[cfg(feature = "rand")]
#[derive(Clone, Debug, Default)]
pub struct RngSource<R>(pub R);

#[cfg(feature = "rand")]
impl<R: RngCore + Send> EntropySource for RngSource<R> {
    fn random_bytes(&mut self) -> Option<[u8; 10]> {
        let mut bytes = [0; 10];
        self.0.try_fill_bytes(&mut bytes).ok()?;
        Some(bytes)
    }
}

/// The system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&mut self) -> Option<u64> {
        let since_epoch = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).ok()?;
        u64::try_from(since_epoch.as_millis()).ok()
    }
}

#[cfg_attr(feature = "rand", allow(dead_code))]
struct NoEntropy;

impl EntropySource for NoEntropy {
    fn random_bytes(&mut self) -> Option<[u8; 10]> {
        None
    }
}

struct State {
    entropy: Box<dyn EntropySource>,
    clock: Box<dyn Clock>,
    monotonic: bool,
    last: Option<Ulid>,
}

impl State {
    fn now(&mut self) -> Result<u64, Error> {
        self.clock.timestamp().ok_or(Error::ClockUnavailable)
    }

    fn next(&mut self, timestamp: u64) -> Result<Ulid, Error> {
        if timestamp > TIMESTAMP_MAX {
            return Err(Error::TimestampOutOfRange);
        }

        let previous = self.last.filter(|last| self.monotonic && last.timestamp() == timestamp);

        let ulid = match previous {
            Some(last) => {
                let randomness = last.randomness() + 1;
                if randomness > RANDOM_MASK {
                    log::warn!("randomness of millisecond {timestamp} exhausted");
                    return Err(Error::MonotonicOverflow);
                }
                Ulid::from_parts(timestamp, randomness)?
            }
            None => {
                if self.monotonic && self.last.is_some() {
                    log::trace!("fresh randomness for millisecond {timestamp}");
                }
                let bytes = self.entropy.random_bytes().ok_or(Error::EntropyUnavailable)?;
                let randomness = bytes.iter().fold(0, |n, &byte| (n << 8) | u128::from(byte));
                Ulid::from_parts(timestamp, randomness)?
            }
        };

        self.last = Some(ulid);

        Ok(ulid)
    }
}

/// A ULID generator.
///
/// A generator owns its entropy source, its clock and, when monotonic, the last ULID it
/// handed out. A monotonic generator does not draw new randomness for a ULID within the
/// same millisecond as its predecessor, but increments the predecessor's randomness instead,
/// so ULIDs from one generator are strictly increasing within a millisecond.
///
/// A generator can be shared between threads; all state is behind a mutex which only
/// callers of the same generator contend for.
///
/// # Example
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use sortid::Generator;
///
/// let generator = Generator::new();
///
/// let batch = generator.generate_batch(100)?;
///
/// assert!(batch.windows(2).all(|pair| pair[0] < pair[1]));
/// # Ok(()) }
/// ```
pub struct Generator {
    state: Mutex<State>,
}

impl Generator {
    /// Creates a fast monotonic generator.
    ///
    /// Randomness comes from a small, non-cryptographic PRNG seeded from the operating
    /// system. Use it where identifiers must be unique but need not be unpredictable.
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a generator backed by the operating system's secure random number generator.
    ///
    /// Every ULID gets fresh randomness, even within the same millisecond, so ULIDs cannot be
    /// predicted from their predecessors. Use it for identifiers that double as tokens.
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn secure() -> Self {
        Self::builder().entropy(RngSource(OsRng)).monotonic(false).build()
    }

    /// Returns a [`Builder`] to configure a generator.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // The state is consistent at every point a panic could occur.
        self.state.lock().unwrap_or_else(|poisoned| {
            self.state.clear_poison();
            poisoned.into_inner()
        })
    }

    /// Generates a ULID for the current time of the generator's clock.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockUnavailable`] if the clock cannot deliver a timestamp.
    /// - [`Error::TimestampOutOfRange`] if the timestamp exceeds 48 bits.
    /// - [`Error::EntropyUnavailable`] if the entropy source cannot deliver.
    /// - [`Error::MonotonicOverflow`] if all random values of the millisecond are used up.
    pub fn generate(&self) -> Result<Ulid, Error> {
        let mut state = self.lock();
        let now = state.now()?;
        state.next(now)
    }

    /// Generates a ULID for the given time, truncated to milliseconds.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TimestampOutOfRange`] if `time` is before the Unix epoch or later
    /// than 2<sup>48</sup> milliseconds after it, and otherwise like [`Generator::generate()`].
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use std::time::{Duration, SystemTime};
    /// use sortid::Generator;
    ///
    /// let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_672_574_400_000);
    /// let ulid = Generator::new().generate_with_time(time)?;
    ///
    /// assert_eq!(ulid.datetime()?, time);
    /// # Ok(()) }
    /// ```
    pub fn generate_with_time(&self, time: SystemTime) -> Result<Ulid, Error> {
        let timestamp = util::millis_since_epoch(time)?;
        self.lock().next(timestamp)
    }

    /// Generates `count` ULIDs, each for the clock's time at the moment it is generated.
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::generate()`]; no ULIDs are returned in that case.
    pub fn generate_batch(&self, count: usize) -> Result<Vec<Ulid>, Error> {
        let mut state = self.lock();

        (0..count)
            .map(|_| {
                let now = state.now()?;
                state.next(now)
            })
            .collect()
    }

    /// Generates `count` ULIDs with timestamps spread evenly over `[start, end)`.
    ///
    /// The `i`-th ULID gets the time `start + (end - start) * i / count`, computed in
    /// nanoseconds with truncating division and then truncated to milliseconds.
    /// An empty vector is returned if `count` is zero or `end` is before `start`.
    ///
    /// # Errors
    ///
    /// Fails like [`Generator::generate_with_time()`]; no ULIDs are returned in that case.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use std::time::{Duration, SystemTime};
    /// use sortid::Generator;
    ///
    /// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    /// let end = start + Duration::from_secs(3);
    ///
    /// let ulids = Generator::new().generate_range(start, end, 3)?;
    ///
    /// let seconds: Vec<u64> = ulids.iter().map(|u| u.timestamp() / 1000).collect();
    /// assert_eq!(seconds, [1_700_000_000, 1_700_000_001, 1_700_000_002]);
    /// # Ok(()) }
    /// ```
    pub fn generate_range(&self, start: SystemTime, end: SystemTime, count: usize) -> Result<Vec<Ulid>, Error> {
        const NANOS_PER_SECOND: u128 = 1_000_000_000;

        let Ok(span) = end.duration_since(start) else {
            return Ok(Vec::new());
        };

        let span = span.as_nanos();
        let total = count as u128;

        let mut state = self.lock();

        (0..count)
            .map(|i| {
                let nanos = span.checked_mul(i as u128).ok_or(Error::TimestampOutOfRange)? / total;
                let seconds = u64::try_from(nanos / NANOS_PER_SECOND).map_err(|_| Error::TimestampOutOfRange)?;
                let subsec = u32::try_from(nanos % NANOS_PER_SECOND).map_err(|_| Error::TimestampOutOfRange)?;
                let offset = Duration::new(seconds, subsec);
                let time = start.checked_add(offset).ok_or(Error::TimestampOutOfRange)?;
                state.next(util::millis_since_epoch(time)?)
            })
            .collect()
    }
}

#[cfg(feature = "rand")]
impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Generator")
            .field("monotonic", &state.monotonic)
            .field("last", &state.last)
            .finish_non_exhaustive()
    }
}

/// Configures a [`Generator`].
///
/// By default the generator is monotonic, reads the [`SystemClock`] and, with the `rand`
/// feature, draws randomness from a fast PRNG seeded by the operating system. Without the
/// `rand` feature and without an explicit entropy source, generation fails with
/// [`Error::EntropyUnavailable`].
///
/// # Example
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use sortid::{Clock, Generator, RngSource};
///
/// struct Frozen(u64);
///
/// impl Clock for Frozen {
///     fn timestamp(&mut self) -> Option<u64> {
///         Some(self.0)
///     }
/// }
///
/// let generator = Generator::builder()
///     .entropy(RngSource(rand::rngs::OsRng))
///     .clock(Frozen(1_700_000_000_000))
///     .monotonic(true)
///     .build();
///
/// let u1 = generator.generate().unwrap();
/// let u2 = generator.generate().unwrap();
///
/// assert_eq!(u1.timestamp(), u2.timestamp());
/// assert_eq!(u1.randomness() + 1, u2.randomness());
/// ```
#[must_use]
pub struct Builder {
    entropy: Option<Box<dyn EntropySource>>,
    clock: Box<dyn Clock>,
    monotonic: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            entropy: None,
            clock: Box::new(SystemClock),
            monotonic: true,
        }
    }
}

impl Builder {
    /// Sets the entropy source.
    pub fn entropy<E: EntropySource + 'static>(mut self, entropy: E) -> Self {
        self.entropy = Some(Box::new(entropy));
        self
    }

    /// Sets the clock.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Enables or disables monotonic generation within the same millisecond.
    pub const fn monotonic(mut self, monotonic: bool) -> Self {
        self.monotonic = monotonic;
        self
    }

    /// Builds the generator.
    #[must_use]
    pub fn build(self) -> Generator {
        let entropy = self.entropy.unwrap_or_else(default_entropy);

        let state = State {
            entropy,
            clock: self.clock,
            monotonic: self.monotonic,
            last: None,
        };

        Generator {
            state: Mutex::new(state),
        }
    }
}

#[cfg(feature = "rand")]
fn default_entropy() -> Box<dyn EntropySource> {
    Box::new(RngSource(SmallRng::from_entropy()))
}

#[cfg(not(feature = "rand"))]
fn default_entropy() -> Box<dyn EntropySource> {
    Box::new(NoEntropy)
}

/// Returns the process-wide generator used by [`Ulid::generate()`].
pub fn default_generator() -> &'static Generator {
    static GENERATOR: OnceLock<Generator> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        log::debug!("initialized default generator");
        Generator::builder().build()
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::mpsc, sync::Arc, thread};

    use super::*;

    struct FixedClock(u64);
    impl Clock for FixedClock {
        fn timestamp(&mut self) -> Option<u64> {
            Some(self.0)
        }
    }

    struct FixedEntropy([u8; 10]);
    impl EntropySource for FixedEntropy {
        fn random_bytes(&mut self) -> Option<[u8; 10]> {
            Some(self.0)
        }
    }

    struct NoClock;
    impl Clock for NoClock {
        fn timestamp(&mut self) -> Option<u64> {
            None
        }
    }

    fn fixed(timestamp: u64, random: [u8; 10], monotonic: bool) -> Generator {
        Generator::builder()
            .entropy(FixedEntropy(random))
            .clock(FixedClock(timestamp))
            .monotonic(monotonic)
            .build()
    }

    #[test]
    fn test_monotonic_increment() {
        let generator = fixed(1, [0; 10], true);

        let u1 = generator.generate().unwrap();
        assert_eq!(u1.to_parts(), (1, 0));

        let u2 = generator.generate().unwrap();
        assert_eq!(u2.to_parts(), (1, 1));

        let u3 = generator.generate().unwrap();
        assert_eq!(u3.to_parts(), (1, 2));
    }

    #[test]
    fn test_monotonic_carry() {
        let generator = fixed(7, [0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF], true);

        assert_eq!(generator.generate().unwrap().randomness(), 0xFF);
        assert_eq!(generator.generate().unwrap().randomness(), 0x100);
    }

    #[test]
    fn test_monotonic_overflow() {
        let generator = fixed(1, [0xFF; 10], true);

        let u1 = generator.generate().unwrap();
        assert_eq!(u1.randomness(), RANDOM_MASK);

        assert_eq!(generator.generate(), Err(Error::MonotonicOverflow));
        assert_eq!(generator.generate(), Err(Error::MonotonicOverflow));

        // a new millisecond starts over with fresh randomness
        let time = SystemTime::UNIX_EPOCH + Duration::from_millis(2);
        assert_eq!(generator.generate_with_time(time).unwrap().to_parts(), (2, RANDOM_MASK));
    }

    #[test]
    fn test_non_monotonic_draws_fresh_randomness() {
        let generator = fixed(1, [0x42; 10], false);

        let u1 = generator.generate().unwrap();
        let u2 = generator.generate().unwrap();

        assert_eq!(u1, u2);
        assert_eq!(u1.randomness(), 0x4242_4242_4242_4242_4242);
    }

    #[test]
    fn test_timestamp_change_draws_fresh_randomness() {
        let generator = Generator::builder().entropy(FixedEntropy([0x10; 10])).build();

        let early = SystemTime::UNIX_EPOCH + Duration::from_millis(5_000);
        let late = SystemTime::UNIX_EPOCH + Duration::from_millis(6_000);

        let u1 = generator.generate_with_time(late).unwrap();
        let u2 = generator.generate_with_time(early).unwrap();
        let u3 = generator.generate_with_time(early).unwrap();

        assert_eq!(u1.randomness(), u2.randomness());
        assert_eq!(u2.randomness() + 1, u3.randomness());
        assert!(u2 < u1);
    }

    #[test]
    fn test_source_failures() {
        let generator = Generator::builder().entropy(NoEntropy).build();
        assert_eq!(generator.generate(), Err(Error::EntropyUnavailable));

        let generator = Generator::builder()
            .entropy(FixedEntropy([0; 10]))
            .clock(NoClock)
            .build();
        assert_eq!(generator.generate(), Err(Error::ClockUnavailable));

        let generator = fixed(TIMESTAMP_MAX + 1, [0; 10], true);
        assert_eq!(generator.generate(), Err(Error::TimestampOutOfRange));
    }

    #[test]
    fn test_generate_with_time_out_of_range() {
        let generator = fixed(0, [0; 10], true);

        let before_epoch = SystemTime::UNIX_EPOCH - Duration::from_millis(1);
        assert_eq!(generator.generate_with_time(before_epoch), Err(Error::TimestampOutOfRange));

        let after_max = SystemTime::UNIX_EPOCH + Duration::from_millis(TIMESTAMP_MAX + 1);
        assert_eq!(generator.generate_with_time(after_max), Err(Error::TimestampOutOfRange));

        let max = SystemTime::UNIX_EPOCH + Duration::from_millis(TIMESTAMP_MAX);
        assert_eq!(generator.generate_with_time(max).unwrap().timestamp(), TIMESTAMP_MAX);
    }

    #[test]
    fn test_batch() {
        let generator = fixed(1_000, [0; 10], true);

        assert!(generator.generate_batch(0).unwrap().is_empty());

        let batch = generator.generate_batch(5).unwrap();
        let randomness: Vec<u128> = batch.iter().map(|u| u.randomness()).collect();
        assert_eq!(randomness, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_batch_fails_as_a_whole() {
        let generator = fixed(1, [0xFF; 10], true);
        assert_eq!(generator.generate_batch(2), Err(Error::MonotonicOverflow));
    }

    #[test]
    fn test_range_distribution() {
        let generator = fixed(0, [0; 10], false);

        let start = SystemTime::UNIX_EPOCH + Duration::from_millis(1_000);
        let end = start + Duration::from_millis(10);

        let timestamps: Vec<u64> = generator
            .generate_range(start, end, 3)
            .unwrap()
            .iter()
            .map(|u| u.timestamp())
            .collect();

        // 10 * 1 / 3 = 3.33 ms and 10 * 2 / 3 = 6.66 ms, both truncated
        assert_eq!(timestamps, [1_000, 1_003, 1_006]);
    }

    #[test]
    fn test_range_edge_cases() {
        let generator = fixed(0, [0; 10], true);

        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let end = start + Duration::from_secs(60);

        assert!(generator.generate_range(start, end, 0).unwrap().is_empty());
        assert!(generator.generate_range(end, start, 3).unwrap().is_empty());

        // an empty span puts all ULIDs into the same millisecond
        let same = generator.generate_range(start, start, 3).unwrap();
        assert_eq!(same.len(), 3);
        assert!(same.iter().all(|u| u.timestamp() == 100_000));
        assert!(same.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_range_spanning_centuries() {
        const YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

        let generator = fixed(0, [0; 10], false);

        let start = SystemTime::UNIX_EPOCH;
        let end = start + 1_000 * YEAR;

        let ulids = generator.generate_range(start, end, 3).unwrap();
        assert_eq!(ulids.len(), 3);

        let expected: Vec<u64> = [Duration::ZERO, 1_000 * YEAR / 3, 2_000 * YEAR / 3]
            .iter()
            .map(|offset| u64::try_from(offset.as_millis()).unwrap())
            .collect();
        let timestamps: Vec<u64> = ulids.iter().map(|u| u.timestamp()).collect();
        assert_eq!(timestamps, expected);
    }

    #[test]
    #[cfg(feature = "rand")]
    fn test_secure_generator_is_not_monotonic() {
        let generator = Generator::secure();
        let u1 = generator.generate().unwrap();
        let u2 = generator.generate().unwrap();

        assert_ne!(u1, u2);
        assert!(!generator.lock().monotonic);
    }

    #[test]
    #[cfg(feature = "rand")]
    fn test_no_duplicates_under_multithreading() {
        let generator = Arc::new(Generator::new());

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    tx.send(generator.generate().unwrap()).unwrap();
                }
            });
        }
        drop(tx);

        let mut seen = HashSet::new();
        while let Ok(ulid) = rx.recv() {
            seen.insert(ulid);
        }

        assert_eq!(seen.len(), 4 * 10_000);
    }

    #[test]
    #[cfg(feature = "rand")]
    fn test_strictly_increasing_per_thread() {
        let generator = Arc::new(Generator::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    let ulids: Vec<Ulid> = (0..1_000).map(|_| generator.generate().unwrap()).collect();
                    ulids.windows(2).all(|pair| pair[0] < pair[1])
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
