use serde::{Deserialize, Serialize};

use crate::model::keys::UserId;

/// The `page` value that marks an actual song playback.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One user interaction from the application log.
///
/// Only records whose `page` is [`NEXT_SONG_PAGE`] describe a playback;
/// the rest (home page views, logins, settings) are read but never used
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventRecord {
    /// Event time in epoch milliseconds.
    pub ts: Option<i64>,
    pub page: Option<String>,
    #[serde(alias = "userid", deserialize_with = "UserId::deserialize_lenient")]
    pub user_id: Option<UserId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,

    pub auth: Option<String>,
    pub item_in_session: Option<i64>,
    pub length: Option<f64>,
    pub method: Option<String>,
    pub registration: Option<f64>,
    pub status: Option<i64>,
}

impl EventRecord {
    /// Whether this record is a song playback.
    #[must_use]
    pub fn is_song_play(&self) -> bool {
        self.page.as_deref() == Some(NEXT_SONG_PAGE)
    }

    /// The `(artist, song)` pair used to match catalog records.
    #[must_use]
    pub fn match_key(&self) -> Option<(&str, &str)> {
        Some((self.artist.as_deref()?, self.song.as_deref()?))
    }
}
