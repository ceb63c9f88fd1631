use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::model::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};

use super::ColumnarTable;

fn strings<'a, T: 'a>(
    rows: &[&'a T],
    get: impl Fn(&'a T) -> Option<&'a str>,
) -> ArrayRef {
    Arc::new(StringArray::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn longs<T>(rows: &[&T], get: impl Fn(&T) -> Option<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn ints<T>(rows: &[&T], get: impl Fn(&T) -> Option<i32>) -> ArrayRef {
    Arc::new(Int32Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn doubles<T>(rows: &[&T], get: impl Fn(&T) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn partition_value<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

// ============================================================================
// songs
// ============================================================================

impl ColumnarTable for SongRow {
    const NAME: &'static str = "songs";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "artist_id"];

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, true),
            Field::new("title", DataType::Utf8, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![
            partition_value(self.year),
            partition_value(self.artist_id.as_ref()),
        ]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            Self::file_schema(),
            vec![
                strings(rows, |r| r.song_id.as_ref().map(|id| id.as_str())),
                strings(rows, |r| r.title.as_deref()),
                doubles(rows, |r| r.duration),
            ],
        )?;
        Ok(batch)
    }
}

// ============================================================================
// artists
// ============================================================================

impl ColumnarTable for ArtistRow {
    const NAME: &'static str = "artists";
    const PARTITION_COLUMNS: &'static [&'static str] = &[];

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("artist_name", DataType::Utf8, true),
            Field::new("artist_location", DataType::Utf8, true),
            Field::new("artist_latitude", DataType::Float64, true),
            Field::new("artist_longitude", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            Self::file_schema(),
            vec![
                strings(rows, |r| r.artist_id.as_ref().map(|id| id.as_str())),
                strings(rows, |r| r.artist_name.as_deref()),
                strings(rows, |r| r.artist_location.as_deref()),
                doubles(rows, |r| r.artist_latitude),
                doubles(rows, |r| r.artist_longitude),
            ],
        )?;
        Ok(batch)
    }
}

// ============================================================================
// users
// ============================================================================

impl ColumnarTable for UserRow {
    const NAME: &'static str = "users";
    const PARTITION_COLUMNS: &'static [&'static str] = &[];

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("userid", DataType::Utf8, true),
            Field::new("firstName", DataType::Utf8, true),
            Field::new("lastName", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            Self::file_schema(),
            vec![
                strings(rows, |r| r.user_id.as_ref().map(|id| id.as_str())),
                strings(rows, |r| r.first_name.as_deref()),
                strings(rows, |r| r.last_name.as_deref()),
                strings(rows, |r| r.gender.as_deref()),
                strings(rows, |r| r.level.as_deref()),
            ],
        )?;
        Ok(batch)
    }
}

// ============================================================================
// time
// ============================================================================

impl ColumnarTable for TimeRow {
    const NAME: &'static str = "time";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "month"];

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("datetime", DataType::Utf8, true),
            Field::new("hour", DataType::Int32, true),
            Field::new("day", DataType::Int32, true),
            Field::new("week", DataType::Int32, true),
            Field::new("weekday", DataType::Int32, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![partition_value(self.year), partition_value(self.month)]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let dates: Vec<Option<String>> = rows
            .iter()
            .map(|r| r.datetime.map(|d| d.format("%Y-%m-%d").to_string()))
            .collect();

        let batch = RecordBatch::try_new(
            Self::file_schema(),
            vec![
                Arc::new(StringArray::from(dates)),
                ints(rows, |r| r.hour),
                ints(rows, |r| r.day),
                ints(rows, |r| r.week),
                ints(rows, |r| r.weekday),
            ],
        )?;
        Ok(batch)
    }
}

// ============================================================================
// songplays
// ============================================================================

impl ColumnarTable for SongplayRow {
    const NAME: &'static str = "songplays";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "month"];

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("ts", DataType::Int64, true),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![partition_value(self.year), partition_value(self.month)]
    }

    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let batch = RecordBatch::try_new(
            Self::file_schema(),
            vec![
                Arc::new(Int64Array::from(
                    rows.iter().map(|r| r.songplay_id.get()).collect::<Vec<_>>(),
                )),
                longs(rows, |r| r.ts),
                strings(rows, |r| r.user_id.as_ref().map(|id| id.as_str())),
                strings(rows, |r| r.level.as_deref()),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.song_id.as_str()).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.artist_id.as_str()).collect::<Vec<_>>(),
                )),
                longs(rows, |r| r.session_id),
                strings(rows, |r| r.location.as_deref()),
                strings(rows, |r| r.user_agent.as_deref()),
            ],
        )?;
        Ok(batch)
    }
}
