//! Pure transformations from raw records to table rows.
//!
//! Every function here takes borrowed record sets and returns owned rows;
//! none of them touch storage.

mod catalog;
mod events;
mod songplays;

pub use catalog::{artists_table, songs_table};
pub use events::{song_plays, time_table, users_table};
pub use songplays::songplays_table;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Clock used to turn epoch milliseconds into calendar fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    /// The host's local time zone.
    #[default]
    Local,
    Utc,
}

impl TimeBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Utc => "utc",
        }
    }
}

impl fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            other => Err(format!("unknown time basis '{other}' (expected local or utc)")),
        }
    }
}

/// Switches that change how rows are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub time_basis: TimeBasis,
    /// Store the hour of day in `time.year`.
    pub hour_as_year: bool,
}

/// Keeps the first item seen for each key, preserving input order.
pub(crate) fn dedup_first<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Converts epoch milliseconds into a wall-clock timestamp.
///
/// `None` when the value is outside chrono's representable range.
pub(crate) fn to_naive(ts_ms: i64, basis: TimeBasis) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp_millis(ts_ms)?;
    Some(match basis {
        TimeBasis::Utc => utc.naive_utc(),
        TimeBasis::Local => utc.with_timezone(&Local).naive_local(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_dedup_first_keeps_first() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let kept = dedup_first(items, |(k, _)| *k);
        assert_eq!(kept, vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_dedup_first_treats_none_as_a_key() {
        let items = vec![None, Some(1), None];
        let kept = dedup_first(items, |item| *item);
        assert_eq!(kept, vec![None, Some(1)]);
    }

    #[test]
    fn test_to_naive_utc() {
        let ts = to_naive(1_600_000_000_000, TimeBasis::Utc).unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2020, 9, 13));
        assert_eq!((ts.hour(), ts.minute()), (12, 26));
    }

    #[test]
    fn test_to_naive_local_uses_host_zone() {
        let ts = 1_600_000_000_000;
        let expected = Local
            .timestamp_millis_opt(ts)
            .single()
            .unwrap()
            .naive_local();
        assert_eq!(to_naive(ts, TimeBasis::Local), Some(expected));
        assert_eq!(to_naive(ts, TimeBasis::default()), Some(expected));
    }

    #[test]
    fn test_to_naive_out_of_range() {
        assert!(to_naive(i64::MAX, TimeBasis::Utc).is_none());
    }

    #[test]
    fn test_time_basis_serde() {
        let basis: TimeBasis = serde_json::from_str("\"utc\"").unwrap();
        assert_eq!(basis, TimeBasis::Utc);
        assert_eq!(serde_json::to_string(&TimeBasis::Local).unwrap(), "\"local\"");
    }

    #[test]
    fn test_time_basis_from_str() {
        assert_eq!("utc".parse::<TimeBasis>(), Ok(TimeBasis::Utc));
        assert_eq!(TimeBasis::Local.to_string(), "local");
        assert!("UTC+1".parse::<TimeBasis>().is_err());
    }
}
