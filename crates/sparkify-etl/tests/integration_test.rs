//! Integration tests for the full read → transform → write pipeline.
//!
//! Each test builds a small record tree on disk, runs the pipeline against
//! a local output root and reads the Parquet files back.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use arrow::array::{Array, Int32Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use sparkify_etl::{Config, Pipeline, TimeBasis};
use tempfile::TempDir;

const SONG_S1: &str = r#"{"num_songs": 1, "song_id": "S1", "title": "Test Song", "artist_id": "A1", "artist_name": "Test Artist", "artist_location": "Oslo", "artist_latitude": null, "artist_longitude": null, "year": 2000, "duration": 200.0}"#;
const SONG_S1_RETITLED: &str = r#"{"num_songs": 1, "song_id": "S1", "title": "Alternate Title", "artist_id": "A1", "artist_name": "Test Artist", "year": 2000, "duration": 201.0}"#;
const PLAY_S1: &str = r#"{"artist": "Test Artist", "song": "Test Song", "page": "NextSong", "userId": "7", "firstName": "Ann", "lastName": "Lee", "gender": "F", "level": "free", "sessionId": 1, "location": "NY", "userAgent": "ua", "ts": 1600000000000}"#;
const PLAY_UNKNOWN: &str = r#"{"artist": "Nobody", "song": "Nothing", "page": "NextSong", "userId": "8", "level": "paid", "sessionId": 2, "ts": 1600000000000}"#;
const HOME_VIEW: &str = r#"{"artist": null, "song": null, "page": "Home", "userId": "7", "ts": 1600000000000}"#;

struct Fixture {
    _temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new(songs: &[&str], events: &[&str]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");

        for (i, song) in songs.iter().enumerate() {
            write(&input.join(format!("song_data/A/B/C/TRABC{i:03}.json")), song);
        }
        write(
            &input.join("log_data/2020/09/2020-09-13-events.json"),
            &events.join("\n"),
        );

        Self {
            _temp_dir: temp_dir,
            input,
            output,
        }
    }

    fn config(&self) -> Config {
        Config {
            input_root: self.input.display().to_string(),
            output_root: self.output.display().to_string(),
            time_basis: TimeBasis::Utc,
            ..Default::default()
        }
    }

    async fn run(&self) {
        let pipeline = Pipeline::from_config(&self.config())
            .await
            .expect("Failed to connect pipeline");
        pipeline.run().await.expect("Pipeline run failed");
    }

    fn table(&self, name: &str) -> Vec<RecordBatch> {
        parquet_files(&self.output.join(name))
            .iter()
            .flat_map(|path| read_batches(path))
            .collect()
    }

    /// Every row of a table rendered as `partition dir | col=value ...`,
    /// sorted so comparisons ignore file and row order.
    fn rendered_rows(&self, name: &str, skip: &[&str]) -> Vec<String> {
        let root = self.output.join(name);
        let mut rows = Vec::new();

        for path in parquet_files(&root) {
            let dir = path
                .parent()
                .and_then(|parent| parent.strip_prefix(&root).ok())
                .map(|dir| dir.display().to_string())
                .unwrap_or_default();

            for batch in read_batches(&path) {
                let schema = batch.schema();
                let options = FormatOptions::default().with_null("null");
                let columns: Vec<(String, ArrayFormatter<'_>)> = schema
                    .fields()
                    .iter()
                    .zip(batch.columns())
                    .filter(|(field, _)| !skip.contains(&field.name().as_str()))
                    .map(|(field, column)| {
                        let formatter = ArrayFormatter::try_new(column.as_ref(), &options).unwrap();
                        (field.name().clone(), formatter)
                    })
                    .collect();

                for row in 0..batch.num_rows() {
                    let values: Vec<String> = columns
                        .iter()
                        .map(|(name, formatter)| format!("{name}={}", formatter.value(row)))
                        .collect();
                    rows.push(format!("{dir} | {}", values.join(" ")));
                }
            }
        }

        rows.sort();
        rows
    }

    fn row_count(&self, name: &str) -> usize {
        self.table(name).iter().map(RecordBatch::num_rows).sum()
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn parquet_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    files.sort();
    files
}

fn read_batches(path: &Path) -> Vec<RecordBatch> {
    let bytes = Bytes::from(fs::read(path).unwrap());
    ParquetRecordBatchReaderBuilder::try_new(bytes)
        .unwrap()
        .build()
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

fn strings(batch: &RecordBatch, column: &str) -> Vec<String> {
    let array = batch
        .column_by_name(column)
        .unwrap_or_else(|| panic!("missing column {column}"))
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    (0..array.len()).map(|i| array.value(i).to_string()).collect()
}

fn relative_dirs(root: &Path) -> BTreeSet<String> {
    parquet_files(root)
        .iter()
        .filter_map(|path| path.parent()?.strip_prefix(root).ok())
        .map(|dir| dir.display().to_string())
        .collect()
}

/// A single matching playback yields one row in every table.
#[tokio::test]
async fn test_single_match_scenario() {
    let fixture = Fixture::new(&[SONG_S1], &[PLAY_S1, HOME_VIEW]);
    fixture.run().await;

    for table in ["songs", "artists", "users", "time", "songplays"] {
        assert_eq!(fixture.row_count(table), 1, "{table} should hold one row");
        assert!(fixture.output.join(table).join("_SUCCESS").is_file());
    }

    let songplays = fixture.table("songplays");
    let batch = &songplays[0];
    assert_eq!(strings(batch, "song_id"), vec!["S1"]);
    assert_eq!(strings(batch, "artist_id"), vec!["A1"]);
    assert_eq!(strings(batch, "user_id"), vec!["7"]);
    let ids = batch
        .column_by_name("songplay_id")
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(ids.value(0), 0);

    let users = fixture.table("users");
    assert_eq!(strings(&users[0], "userid"), vec!["7"]);
    assert_eq!(strings(&users[0], "firstName"), vec!["Ann"]);
}

/// Partition directories follow the declared column order.
#[tokio::test]
async fn test_partition_layout() {
    let fixture = Fixture::new(&[SONG_S1], &[PLAY_S1]);
    fixture.run().await;

    assert_eq!(
        relative_dirs(&fixture.output.join("songs")),
        BTreeSet::from(["year=2000/artist_id=A1".to_string()])
    );
    assert_eq!(
        relative_dirs(&fixture.output.join("time")),
        BTreeSet::from(["year=2020/month=9".to_string()])
    );
    assert_eq!(
        relative_dirs(&fixture.output.join("songplays")),
        BTreeSet::from(["year=2020/month=9".to_string()])
    );
    assert_eq!(
        relative_dirs(&fixture.output.join("artists")),
        BTreeSet::from([String::new()])
    );

    let time = fixture.table("time");
    let schema = time[0].schema();
    assert!(schema.field_with_name("year").is_err());
    assert!(schema.field_with_name("month").is_err());
    assert_eq!(strings(&time[0], "datetime"), vec!["2020-09-13"]);
    let hours = time[0]
        .column_by_name("hour")
        .unwrap()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(hours.value(0), 12);
}

/// A playback with no catalog match still counts as a user and a time row.
#[tokio::test]
async fn test_non_matching_event() {
    let fixture = Fixture::new(&[SONG_S1], &[PLAY_UNKNOWN]);
    fixture.run().await;

    assert_eq!(fixture.row_count("songplays"), 0);
    assert_eq!(fixture.row_count("users"), 1);
    assert_eq!(fixture.row_count("time"), 1);
    assert!(fixture.output.join("songplays/_SUCCESS").is_file());
}

/// Two catalog records sharing a song id collapse to one songs row.
#[tokio::test]
async fn test_duplicate_song_id() {
    let fixture = Fixture::new(&[SONG_S1, SONG_S1_RETITLED], &[PLAY_S1]);
    fixture.run().await;

    let songs = fixture.table("songs");
    assert_eq!(songs.iter().map(RecordBatch::num_rows).sum::<usize>(), 1);
    assert_eq!(strings(&songs[0], "title"), vec!["Test Song"]);
    assert_eq!(fixture.row_count("artists"), 1);
}

/// Running twice on unchanged input gives the same tables, row for row.
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let fixture = Fixture::new(
        &[SONG_S1, SONG_S1_RETITLED],
        &[PLAY_S1, PLAY_UNKNOWN, HOME_VIEW, PLAY_S1],
    );
    let snapshot = |fixture: &Fixture| -> Vec<Vec<String>> {
        vec![
            fixture.rendered_rows("songs", &[]),
            fixture.rendered_rows("artists", &[]),
            fixture.rendered_rows("users", &[]),
            fixture.rendered_rows("time", &[]),
            fixture.rendered_rows("songplays", &["songplay_id"]),
        ]
    };

    fixture.run().await;
    let first = snapshot(&fixture);

    fixture.run().await;
    let second = snapshot(&fixture);

    assert_eq!(first, second);
    assert_eq!(first[0].len(), 1);
    assert_eq!(first[2].len(), 3);
    assert_eq!(first[4].len(), 2);
    assert!(first[0][0].starts_with("year=2000/artist_id=A1 | song_id=S1 title=Test Song"));
    assert!(first[4]
        .iter()
        .all(|row| row.starts_with("year=2020/month=9 | ts=1600000000000 user_id=7")));

    // Old part files are replaced, not accumulated.
    assert_eq!(parquet_files(&fixture.output.join("songs")).len(), 1);
}

/// A malformed line aborts the run and names the file and line.
#[tokio::test]
async fn test_malformed_record_fails_run() {
    let fixture = Fixture::new(&[SONG_S1], &[PLAY_S1, "{\"page\": "]);

    let pipeline = Pipeline::from_config(&fixture.config()).await.unwrap();
    let err = pipeline.run().await.unwrap_err();

    assert!(err.is_input_error());
    assert!(err.to_string().contains("2020-09-13-events.json:2"));
}
