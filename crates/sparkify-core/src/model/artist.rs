use serde::{Deserialize, Serialize};

use crate::model::catalog::CatalogRecord;
use crate::model::keys::ArtistId;

/// A row of the `artists` dimension table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRow {
    pub artist_id: Option<ArtistId>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl From<&CatalogRecord> for ArtistRow {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            artist_id: record.artist_id.clone(),
            artist_name: record.artist_name.clone(),
            artist_location: record.artist_location.clone(),
            artist_latitude: record.artist_latitude,
            artist_longitude: record.artist_longitude,
        }
    }
}
