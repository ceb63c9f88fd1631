use std::collections::HashMap;

use sparkify_core::model::{CatalogRecord, EventRecord, SongplayId, SongplayRow};

use super::events::{song_plays, year_month};
use super::TransformOptions;

/// Derives the songplays fact table.
///
/// Each playback is inner-joined to every catalog record whose
/// `(artist_name, title)` equals the event's `(artist, song)` exactly.
/// The catalog is used as read, so a song listed twice produces two rows
/// per matching playback. Catalog records without a `song_id` or
/// `artist_id` cannot form a fact row and are skipped.
///
/// Ids are assigned from 0 in event order, then catalog order.
pub fn songplays_table(
    events: &[EventRecord],
    catalog: &[CatalogRecord],
    options: TransformOptions,
) -> Vec<SongplayRow> {
    let mut index: HashMap<(&str, &str), Vec<&CatalogRecord>> = HashMap::new();
    for record in catalog {
        if record.song_id.is_none() || record.artist_id.is_none() {
            continue;
        }
        if let Some(key) = record.match_key() {
            index.entry(key).or_default().push(record);
        }
    }

    let mut rows = Vec::new();
    for event in song_plays(events) {
        let Some(matches) = event.match_key().and_then(|key| index.get(&key)) else {
            continue;
        };
        let (year, month) = year_month(event.ts, options);

        for record in matches {
            let (Some(song_id), Some(artist_id)) = (&record.song_id, &record.artist_id) else {
                continue;
            };
            rows.push(SongplayRow {
                songplay_id: SongplayId::new(rows.len() as i64),
                ts: event.ts,
                user_id: event.user_id.clone(),
                level: event.level.clone(),
                song_id: song_id.clone(),
                artist_id: artist_id.clone(),
                session_id: event.session_id,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
                year,
                month,
            });
        }
    }

    log::debug!(
        "Matched {} song plays against {} catalog keys",
        rows.len(),
        index.len()
    );
    rows
}
