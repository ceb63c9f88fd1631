use serde::{Deserialize, Serialize};

use crate::model::keys::{ArtistId, SongId};

/// One song from the catalog dump, with its artist denormalized onto it.
///
/// Every field is optional: a missing key and an explicit `null` both read
/// as `None`, while a value of the wrong JSON type is a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRecord {
    pub num_songs: Option<i64>,
    pub song_id: Option<SongId>,
    pub title: Option<String>,
    pub artist_id: Option<ArtistId>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

impl CatalogRecord {
    /// The `(artist_name, title)` pair used to match playback events.
    ///
    /// `None` when either side is absent, since an absent value never
    /// matches anything.
    #[must_use]
    pub fn match_key(&self) -> Option<(&str, &str)> {
        Some((self.artist_name.as_deref()?, self.title.as_deref()?))
    }
}
