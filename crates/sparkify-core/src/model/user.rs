use serde::{Deserialize, Serialize};

use crate::model::event::EventRecord;
use crate::model::keys::UserId;

/// A row of the `users` dimension table.
///
/// One row is produced per playback, so the same user appears once per
/// event with the subscription `level` they had at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: Option<UserId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl From<&EventRecord> for UserRow {
    fn from(event: &EventRecord) -> Self {
        Self {
            user_id: event.user_id.clone(),
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level.clone(),
        }
    }
}
