use std::{
    fmt::Formatter,
    time::{Duration, SystemTime},
};

use crate::{base32, Error, RANDOM_BITS, RANDOM_MASK, TIMESTAMP_MAX};

pub fn as_array<const N: usize>(bytes: &[u8]) -> Result<&[u8; N], Error> {
    bytes.try_into().map_err(|_| {
        if bytes.len() < N {
            Error::TooShort
        } else {
            Error::TooLong
        }
    })
}

pub const fn from_parts(timestamp: u64, randomness: u128) -> Result<u128, Error> {
    if timestamp > TIMESTAMP_MAX {
        Err(Error::TimestampOutOfRange)
    } else if randomness > RANDOM_MASK {
        Err(Error::RandomnessOutOfRange)
    } else {
        Ok(((timestamp as u128) << RANDOM_BITS) | randomness)
    }
}

/// Milliseconds since the Unix epoch, truncated.
pub fn millis_since_epoch(time: SystemTime) -> Result<u64, Error> {
    let since_epoch = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| Error::TimestampOutOfRange)?;

    u64::try_from(since_epoch.as_millis())
        .ok()
        .filter(|&millis| millis <= TIMESTAMP_MAX)
        .ok_or(Error::TimestampOutOfRange)
}

pub fn datetime(millis: u64) -> Result<SystemTime, Error> {
    SystemTime::UNIX_EPOCH
        .checked_add(Duration::from_millis(millis))
        .ok_or(Error::TimestampOutOfRange)
}

pub fn debug_ulid(name: &str, ulid: u128, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
    struct Timestamp(u64);
    impl std::fmt::Debug for Timestamp {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
            write!(f, "\"{ts}\"", ts = timestamp_to_string(self.0))
        }
    }

    struct Randomness(u128);
    impl std::fmt::Debug for Randomness {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
            write!(f, "\"{:020X}\"", self.0)
        }
    }

    let mut buffer = [0; 26];

    let string = base32::encode(ulid, &mut buffer);
    let timestamp = Timestamp((ulid >> RANDOM_BITS) as u64);
    let randomness = Randomness(ulid & RANDOM_MASK);

    f.debug_struct(name)
        .field("string", &string)
        .field("timestamp", &timestamp)
        .field("randomness", &randomness)
        .finish()
}

/// Renders milliseconds since the Unix epoch as an ISO-8601 UTC timestamp.
fn timestamp_to_string(millis: u64) -> String {
    const DAYS_PER_YEAR: u64 = 365;
    const DAYS_PER_LEAP_YEAR: u64 = DAYS_PER_YEAR + 1;

    const DAYS_PER_QUAD_YEAR: u64 = 4 * DAYS_PER_YEAR + 1;
    const DAYS_PER_CENTURY: u64 = 25 * DAYS_PER_QUAD_YEAR - 1;
    const DAYS_PER_QUADRICENTENNIAL: u64 = 4 * DAYS_PER_CENTURY + 1;

    // Day count is taken relative to 1600-01-01, the start of a 400 year cycle.
    const BASE: u64 = 1600;
    const DAYS_BASE_TO_1970: u64 = 3 * DAYS_PER_CENTURY + 1 + 70 * DAYS_PER_YEAR + 70 / 4;

    let (seconds, millis) = (millis / 1000, millis % 1000);
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let (days, hours) = (hours / 24, hours % 24);

    let days = days + DAYS_BASE_TO_1970;

    let (cycles, days) = (days / DAYS_PER_QUADRICENTENNIAL, days % DAYS_PER_QUADRICENTENNIAL);
    let (centuries, days) = (days / DAYS_PER_CENTURY, days % DAYS_PER_CENTURY);
    let (quad_years, days) = (days / DAYS_PER_QUAD_YEAR, days % DAYS_PER_QUAD_YEAR);

    let is_leap_year = days < DAYS_PER_LEAP_YEAR;

    let (years, days) = if is_leap_year {
        (0, days)
    } else {
        let days = days - DAYS_PER_LEAP_YEAR;
        (days / DAYS_PER_YEAR + 1, days % DAYS_PER_YEAR)
    };

    let year = BASE + cycles * 400 + centuries * 100 + quad_years * 4 + years;

    let february = if is_leap_year { 29 } else { 28 };
    let days_in_month = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    let mut day = days;
    let mut month = 0;
    while day >= days_in_month[month] {
        day -= days_in_month[month];
        month += 1;
    }

    format!(
        "{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z",
        month = month + 1,
        day = day + 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_string() {
        assert_eq!(timestamp_to_string(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(timestamp_to_string((1 << 48) - 1), "10889-08-02T05:31:50.655Z");

        assert_eq!(timestamp_to_string(1_709_164_800_000), "2024-02-29T00:00:00.000Z");
        assert_eq!(timestamp_to_string(1_740_787_200_000), "2025-03-01T00:00:00.000Z");
        assert_eq!(timestamp_to_string(1_672_574_400_000), "2023-01-01T12:00:00.000Z");
    }

    #[test]
    fn test_as_array() {
        assert!(as_array::<4>(b"abcd").is_ok());
        assert_eq!(as_array::<4>(b"abc"), Err(Error::TooShort));
        assert_eq!(as_array::<4>(b"abcde"), Err(Error::TooLong));
    }

    #[test]
    fn test_millis_since_epoch() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_micros(1_500);
        assert_eq!(millis_since_epoch(time), Ok(1));

        let before_epoch = SystemTime::UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(millis_since_epoch(before_epoch), Err(Error::TimestampOutOfRange));

        let too_late = SystemTime::UNIX_EPOCH + Duration::from_millis(TIMESTAMP_MAX + 1);
        assert_eq!(millis_since_epoch(too_late), Err(Error::TimestampOutOfRange));
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(from_parts(0, 0), Ok(0));
        assert_eq!(from_parts(1, 1), Ok((1 << 80) | 1));
        assert_eq!(from_parts(1 << 48, 0), Err(Error::TimestampOutOfRange));
        assert_eq!(from_parts(0, 1 << 80), Err(Error::RandomnessOutOfRange));
    }
}
