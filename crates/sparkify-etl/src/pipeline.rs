//! End-to-end run: read both record families, derive the five tables,
//! write each one.

use std::fmt;

use crate::config::Config;
use crate::error::EtlResult;
use crate::reader::RecordReader;
use crate::session::Session;
use crate::transform::{
    artists_table, songplays_table, songs_table, time_table, users_table, TransformOptions,
};
use crate::writer::{Compression, TableWriter, WriteReport};

/// One configured run of the ETL.
#[derive(Debug)]
pub struct Pipeline {
    session: Session,
    options: TransformOptions,
    compression: Compression,
}

/// Counts from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub catalog_records: usize,
    pub event_records: usize,
    pub song_plays: usize,
    pub tables: Vec<WriteReport>,
}

impl RunSummary {
    /// Rows written to `table`, if it was written.
    pub fn rows(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|report| report.table == table)
            .map(|report| report.rows)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "read {} catalog records and {} events ({} song plays)",
            self.catalog_records, self.event_records, self.song_plays
        )?;
        for report in &self.tables {
            writeln!(f, "  {report}")?;
        }
        Ok(())
    }
}

impl Pipeline {
    pub fn new(session: Session, options: TransformOptions, compression: Compression) -> Self {
        Self {
            session,
            options,
            compression,
        }
    }

    /// Connects the configured input and output roots.
    ///
    /// Fails before any read when a location is unsupported or lacks
    /// credentials.
    pub async fn from_config(config: &Config) -> EtlResult<Self> {
        let options = config.transform_options();
        if options.hour_as_year {
            log::warn!("compat.hour_as_year is set: time.year will hold the hour of day");
        }

        let session =
            Session::connect(&config.input_root, &config.output_root, &config.storage).await?;
        Ok(Self::new(session, options, config.compression))
    }

    /// Executes the run. Every table is recomputed and its destination
    /// replaced; the first error aborts the run.
    pub async fn run(&self) -> EtlResult<RunSummary> {
        let reader = RecordReader::new(self.session.input());
        let (catalog, events) = tokio::try_join!(reader.read_catalog(), reader.read_events())?;

        let writer = TableWriter::new(self.session.output(), self.compression);
        let mut tables = Vec::with_capacity(5);

        tables.push(writer.write(&songs_table(&catalog)).await?);
        tables.push(writer.write(&artists_table(&catalog)).await?);

        let users = users_table(&events);
        let song_plays = users.len();
        tables.push(writer.write(&users).await?);
        tables.push(writer.write(&time_table(&events, self.options)).await?);
        tables.push(
            writer
                .write(&songplays_table(&events, &catalog, self.options))
                .await?,
        );

        let summary = RunSummary {
            catalog_records: catalog.len(),
            event_records: events.len(),
            song_plays,
            tables,
        };
        log::info!(
            "Run complete: {} song plays, {} songplays rows",
            summary.song_plays,
            summary.rows("songplays").unwrap_or_default()
        );
        Ok(summary)
    }
}
