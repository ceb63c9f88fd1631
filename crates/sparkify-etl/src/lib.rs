//! ETL pipeline for sparkify.
//!
//! Reads the catalog (`song_data`) and application log (`log_data`) record
//! trees, derives the songs, artists, users and time dimension tables and
//! the songplays fact table, and writes each one as partitioned Parquet.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod session;
pub mod storage;
pub mod transform;
pub mod writer;

pub use config::Config;
pub use error::{EtlError, EtlResult};
pub use pipeline::{Pipeline, RunSummary};
pub use reader::RecordReader;
pub use session::Session;
pub use transform::{TimeBasis, TransformOptions};
pub use writer::{Compression, TableWriter, WriteReport};
