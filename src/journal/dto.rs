use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::journal::repo::Entry;

/// Request body for creating or updating a journal entry.
#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    pub entry: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub entry: String,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_edited_on: OffsetDateTime,
}

impl From<Entry> for EntryResponse {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            entry: e.entry,
            user_id: e.user_id,
            created_on: e.created_on,
            last_edited_on: e.last_edited_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn entry_serializes_with_rfc3339_timestamps() {
        let response = EntryResponse::from(Entry {
            id: 1,
            entry: "Had coffee".into(),
            user_id: 2,
            created_on: datetime!(2024-03-01 08:00:00 UTC),
            last_edited_on: datetime!(2024-03-01 09:30:00 UTC),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["entry"], "Had coffee");
        assert_eq!(json["created_on"], "2024-03-01T08:00:00Z");
        assert_eq!(json["last_edited_on"], "2024-03-01T09:30:00Z");
    }
}
