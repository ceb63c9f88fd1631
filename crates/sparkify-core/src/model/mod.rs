pub mod artist;
pub mod catalog;
pub mod event;
pub mod keys;
pub mod song;
pub mod songplay;
pub mod time;
pub mod user;

pub use artist::ArtistRow;
pub use catalog::CatalogRecord;
pub use event::{EventRecord, NEXT_SONG_PAGE};
pub use keys::{ArtistId, SongId, SongplayId, UserId};
pub use song::SongRow;
pub use songplay::SongplayRow;
pub use time::TimeRow;
pub use user::UserRow;
