//! Persists table rows as Hive-partitioned Parquet.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression as Codec, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use sparkify_core::schema::{partition_path, ColumnarTable};
use uuid::Uuid;

use crate::error::EtlResult;
use crate::storage::{join_key, ObjectBackend};

/// Marker object written once a table is complete.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Parquet compression codec for data files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Lz4,
    Uncompressed,
}

impl Compression {
    fn codec(self) -> Codec {
        match self {
            Self::Snappy => Codec::SNAPPY,
            Self::Zstd => Codec::ZSTD(ZstdLevel::default()),
            Self::Gzip => Codec::GZIP(GzipLevel::default()),
            Self::Lz4 => Codec::LZ4_RAW,
            Self::Uncompressed => Codec::UNCOMPRESSED,
        }
    }

    /// File name suffix, e.g. `.snappy.parquet`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Snappy => ".snappy.parquet",
            Self::Zstd => ".zstd.parquet",
            Self::Gzip => ".gz.parquet",
            Self::Lz4 => ".lz4raw.parquet",
            Self::Uncompressed => ".parquet",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Snappy => "snappy",
            Self::Zstd => "zstd",
            Self::Gzip => "gzip",
            Self::Lz4 => "lz4",
            Self::Uncompressed => "uncompressed",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "gzip" => Ok(Self::Gzip),
            "lz4" => Ok(Self::Lz4),
            "uncompressed" => Ok(Self::Uncompressed),
            other => Err(format!(
                "unknown compression '{other}' (expected snappy, zstd, gzip, lz4 or uncompressed)"
            )),
        }
    }
}

/// What one table write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub table: &'static str,
    pub rows: usize,
    pub files: usize,
    /// Objects deleted from the previous run's output.
    pub replaced: usize,
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rows in {} files",
            self.table, self.rows, self.files
        )
    }
}

/// Writes tables under `<output root>/<table name>/`.
#[derive(Debug, Clone, Copy)]
pub struct TableWriter<'a> {
    backend: &'a dyn ObjectBackend,
    compression: Compression,
}

impl<'a> TableWriter<'a> {
    pub fn new(backend: &'a dyn ObjectBackend, compression: Compression) -> Self {
        Self {
            backend,
            compression,
        }
    }

    /// Replaces the table's destination with `rows`.
    ///
    /// Existing objects under the table prefix are deleted first, then one
    /// file is written per partition and finally the `_SUCCESS` marker.
    /// A failure part way leaves whatever was already written.
    pub async fn write<T: ColumnarTable>(&self, rows: &[T]) -> EtlResult<WriteReport> {
        let replaced = self.backend.delete_prefix(T::NAME).await?;
        if replaced > 0 {
            log::debug!("Removed {} objects from previous {} output", replaced, T::NAME);
        }

        let mut partitions: BTreeMap<String, Vec<&T>> = BTreeMap::new();
        for row in rows {
            let path = partition_path(T::PARTITION_COLUMNS, &row.partition_values())?;
            partitions.entry(path).or_default().push(row);
        }

        for (partition, members) in &partitions {
            let bytes = self.encode::<T>(members)?;
            let file_name = format!(
                "part-00000-{}{}",
                Uuid::new_v4(),
                self.compression.file_suffix()
            );
            let key = join_key(&[T::NAME, partition.as_str(), file_name.as_str()]);

            log::debug!("Writing {} rows to {}", members.len(), key);
            self.backend.put(&key, bytes).await?;
        }

        self.backend
            .put(&join_key(&[T::NAME, SUCCESS_MARKER]), Bytes::new())
            .await?;

        let report = WriteReport {
            table: T::NAME,
            rows: rows.len(),
            files: partitions.len(),
            replaced,
        };
        log::info!("Wrote {}", report);
        Ok(report)
    }

    fn encode<T: ColumnarTable>(&self, rows: &[&T]) -> EtlResult<Bytes> {
        let batch = T::to_record_batch(rows)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression.codec())
            .build();

        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, T::file_schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(Bytes::from(buffer))
    }
}
