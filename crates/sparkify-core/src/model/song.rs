use serde::{Deserialize, Serialize};

use crate::model::catalog::CatalogRecord;
use crate::model::keys::{ArtistId, SongId};

/// A row of the `songs` dimension table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRow {
    pub song_id: Option<SongId>,
    pub title: Option<String>,
    pub artist_id: Option<ArtistId>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

impl From<&CatalogRecord> for SongRow {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        }
    }
}
