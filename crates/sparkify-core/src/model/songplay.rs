use serde::{Deserialize, Serialize};

use crate::model::keys::{ArtistId, SongId, SongplayId, UserId};

/// A row of the `songplays` fact table: one playback matched to a catalog
/// song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongplayRow {
    pub songplay_id: SongplayId,
    pub ts: Option<i64>,
    pub user_id: Option<UserId>,
    pub level: Option<String>,
    pub song_id: SongId,
    pub artist_id: ArtistId,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    /// Partition column derived from `ts`.
    pub year: Option<i32>,
    /// Partition column derived from `ts`.
    pub month: Option<i32>,
}
