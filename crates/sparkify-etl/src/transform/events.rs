use chrono::{Datelike, NaiveDateTime, Timelike};
use sparkify_core::model::{EventRecord, TimeRow, UserRow};

use super::{to_naive, TransformOptions};

/// The events that are song playbacks, in input order.
pub fn song_plays(events: &[EventRecord]) -> impl Iterator<Item = &EventRecord> {
    events.iter().filter(|event| event.is_song_play())
}

/// Projects the users table: one row per playback, not deduplicated.
pub fn users_table(events: &[EventRecord]) -> Vec<UserRow> {
    song_plays(events).map(UserRow::from).collect()
}

/// Decomposes the timestamp of every playback into calendar fields.
pub fn time_table(events: &[EventRecord], options: TransformOptions) -> Vec<TimeRow> {
    song_plays(events)
        .map(|event| time_row(event.ts, options))
        .collect()
}

pub(crate) fn time_row(ts: Option<i64>, options: TransformOptions) -> TimeRow {
    let Some(at) = ts.and_then(|ms| to_naive(ms, options.time_basis)) else {
        return TimeRow::default();
    };

    let hour = at.hour() as i32;
    let day_of_week = at.weekday().number_from_sunday() as i32;
    TimeRow {
        datetime: Some(at.date()),
        hour: Some(hour),
        day: Some(day_of_week),
        week: Some(at.iso_week().week() as i32),
        month: Some(at.month() as i32),
        year: Some(if options.hour_as_year { hour } else { at.year() }),
        weekday: Some(day_of_week),
    }
}

/// Calendar `(year, month)` of a timestamp, used to partition songplays.
pub(crate) fn year_month(ts: Option<i64>, options: TransformOptions) -> (Option<i32>, Option<i32>) {
    ts.and_then(|ms| to_naive(ms, options.time_basis))
        .map(|at: NaiveDateTime| (Some(at.year()), Some(at.month() as i32)))
        .unwrap_or((None, None))
}
