use sparkify_core::model::{ArtistRow, CatalogRecord, SongRow};

use super::dedup_first;

/// Projects the songs table, one row per `song_id`.
pub fn songs_table(catalog: &[CatalogRecord]) -> Vec<SongRow> {
    let rows = dedup_first(catalog, |record| record.song_id.clone());
    rows.into_iter().map(SongRow::from).collect()
}

/// Projects the artists table, one row per `artist_id`.
pub fn artists_table(catalog: &[CatalogRecord]) -> Vec<ArtistRow> {
    let rows = dedup_first(catalog, |record| record.artist_id.clone());
    rows.into_iter().map(ArtistRow::from).collect()
}
