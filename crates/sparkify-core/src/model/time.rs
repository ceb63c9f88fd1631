use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the `time` dimension table: one decomposed event timestamp.
///
/// Every column is `None` when the source event carried no timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRow {
    /// Calendar date of the event, written as `YYYY-MM-DD`.
    pub datetime: Option<NaiveDate>,
    pub hour: Option<i32>,
    /// Day of week, 1 = Sunday through 7 = Saturday.
    pub day: Option<i32>,
    /// ISO-8601 week of year.
    pub week: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    /// Same value as `day`.
    pub weekday: Option<i32>,
}
