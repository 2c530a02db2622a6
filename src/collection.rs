//! Utilities over collections of ULID strings.
//!
//! Entries which are not valid ULIDs are skipped instead of failing the whole call.
//! Inputs are never modified; results are new collections.

use std::time::{Duration, SystemTime};

use crate::{Error, Ulid};

/// Statistics about a collection of ULIDs.
///
/// The default value describes an empty collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Number of valid ULIDs.
    pub count: usize,
    /// Time between the first and the last ULID.
    pub time_span: Duration,
    /// The earliest ULID, as given.
    pub first_id: String,
    /// The latest ULID, as given.
    pub last_id: String,
    /// Timestamp of the earliest ULID.
    pub first_time: SystemTime,
    /// Timestamp of the latest ULID.
    pub last_time: SystemTime,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            count: 0,
            time_span: Duration::ZERO,
            first_id: String::new(),
            last_id: String::new(),
            first_time: SystemTime::UNIX_EPOCH,
            last_time: SystemTime::UNIX_EPOCH,
        }
    }
}

fn parse_entry(id: &str) -> Option<Ulid> {
    match id.parse::<Ulid>() {
        Ok(ulid) => Some(ulid),
        Err(error) => {
            log::debug!("skipping {id:?}: {error}");
            None
        }
    }
}

/// Computes [`Stats`] over a collection of ULID strings.
///
/// Invalid entries are skipped. The first and the last ULID are the smallest and the largest
/// in ULID order, which orders by timestamp first.
///
/// # Errors
///
/// Fails with [`Error::NoValidEntries`] if the collection is not empty but contains no valid
/// ULID. An empty collection yields `Stats::default()`.
///
/// # Example
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::time::Duration;
///
/// let ids = [
///     "01GNPK7XG0AAAAAAAAAAAAAAAA", // cspell:disable-line
///     "invalid",
///     "01GNS5MMG0BBBBBBBBBBBBBBBB", // cspell:disable-line
/// ];
///
/// let stats = sortid::analyze(&ids)?;
///
/// assert_eq!(stats.count, 2);
/// assert_eq!(stats.time_span, Duration::from_secs(24 * 60 * 60));
/// assert_eq!(stats.first_id, ids[0]);
/// # Ok(()) }
/// ```
pub fn analyze<S: AsRef<str>>(ids: &[S]) -> Result<Stats, Error> {
    if ids.is_empty() {
        return Ok(Stats::default());
    }

    let mut valid = ids
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter_map(|id| Some((parse_entry(id)?, id)))
        .filter_map(|(ulid, id)| match ulid.datetime() {
            Ok(time) => Some((ulid, id, time)),
            Err(error) => {
                log::debug!("skipping {id:?}: {error}");
                None
            }
        });

    let first = valid.next().ok_or(Error::NoValidEntries)?;
    let (count, first, last) = valid.fold((1, first, first), |(count, first, last), entry| {
        let first = if entry.0 < first.0 { entry } else { first };
        let last = if entry.0 >= last.0 { entry } else { last };
        (count + 1, first, last)
    });

    let (_, first_id, first_time) = first;
    let (_, last_id, last_time) = last;

    Ok(Stats {
        count,
        time_span: last_time.duration_since(first_time).unwrap_or_default(),
        first_id: first_id.to_string(),
        last_id: last_id.to_string(),
        first_time,
        last_time,
    })
}

/// Keeps the ULIDs whose timestamp lies within `[start, end]`, both ends inclusive.
///
/// The timestamp extracted from each ULID (millisecond precision) is compared against the
/// bounds as given. Invalid entries are dropped. The order of the kept entries is preserved.
///
/// # Example
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// let ids = ["01GNPK7XG0AAAAAAAAAAAAAAAA", "01GNS5MMG0BBBBBBBBBBBBBBBB", "bogus"]; // cspell:disable-line
///
/// let start = SystemTime::UNIX_EPOCH + Duration::from_millis(1_672_574_400_000);
/// let end = start + Duration::from_secs(60 * 60);
///
/// assert_eq!(sortid::filter_by_time_range(&ids, start, end), [ids[0]]);
/// ```
#[must_use]
pub fn filter_by_time_range<S: AsRef<str> + Clone>(ids: &[S], start: SystemTime, end: SystemTime) -> Vec<S> {
    let range = start..=end;

    ids.iter()
        .filter(|&id| {
            parse_entry(id.as_ref())
                .and_then(|ulid| ulid.datetime().ok())
                .is_some_and(|time| range.contains(&time))
        })
        .cloned()
        .collect()
}

/// Sorts ULID strings chronologically, oldest first.
///
/// The sort is stable and uses ULID order (timestamp, then randomness). Entries which are not
/// valid ULIDs cannot be compared; they keep their positions and the valid entries are sorted
/// into the remaining positions.
///
/// # Example
///
/// ```
/// let ids = ["01GNS5MMG0BBBBBBBBBBBBBBBB", "01GNPK7XG0AAAAAAAAAAAAAAAA"]; // cspell:disable-line
///
/// assert_eq!(sortid::sort_chronologically(&ids), [ids[1], ids[0]]);
/// ```
#[must_use]
pub fn sort_chronologically<S: AsRef<str> + Clone>(ids: &[S]) -> Vec<S> {
    let mut result = ids.to_vec();

    let (slots, mut valid): (Vec<usize>, Vec<(Ulid, &S)>) = ids
        .iter()
        .enumerate()
        .filter_map(|(slot, id)| Some((slot, (parse_entry(id.as_ref())?, id))))
        .unzip();

    valid.sort_by_key(|&(ulid, _)| ulid);

    for (slot, (_, id)) in slots.into_iter().zip(valid) {
        result[slot] = id.clone();
    }

    result
}

/// Sorts ULID strings chronologically, newest first.
///
/// This is the exact reverse of [`sort_chronologically()`].
#[must_use]
pub fn sort_chronologically_descending<S: AsRef<str> + Clone>(ids: &[S]) -> Vec<S> {
    let mut result = sort_chronologically(ids);
    result.reverse();
    result
}
