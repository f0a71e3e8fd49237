use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use lazy_static::lazy_static;
use time::macros::datetime;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::error::ApiError;
use crate::journal::dto::{EntryResponse, NewEntryRequest};

// Demonstration dataset owned by the synthetic user 0, shared across all
// requests for the lifetime of the process. Nothing on this surface is
// authenticated or persisted; it exists so the entry contract can be
// exercised without an account. Updates mutate the seeded entries in
// place; nothing is ever added or removed, so the fixture ids stay
// stable.
lazy_static! {
    static ref DEMO_ENTRIES: Mutex<Vec<EntryResponse>> = Mutex::new(vec![
        demo_entry(
            1,
            "I went for a great walk at the park today.",
            datetime!(2022-07-01 04:29:50.307527 UTC),
        ),
        demo_entry(
            2,
            "I tried a new pasta recipe for dinner tonight.",
            datetime!(2022-07-02 06:29:50.307527 UTC),
        ),
        demo_entry(
            3,
            "There was a great new movie on Netflix that I watched tonight.",
            datetime!(2022-07-02 07:29:50.307527 UTC),
        ),
        demo_entry(
            4,
            "There was so much fresh fruit at the grocery store, so I made a great fruit salad with dinner.",
            datetime!(2022-07-02 14:29:50.307527 UTC),
        ),
        demo_entry(
            5,
            "I got an email from an old friend today that was a really nice surprise.",
            datetime!(2022-07-03 17:29:50.307527 UTC),
        ),
    ]);
}

fn demo_entry(id: i64, text: &str, stamp: OffsetDateTime) -> EntryResponse {
    EntryResponse {
        id,
        entry: text.to_string(),
        user_id: 0,
        created_on: stamp,
        last_edited_on: stamp,
    }
}

/// Valid ids are 1 through the fixture length.
fn fixture_index(id: i64, len: usize) -> Option<usize> {
    if id < 1 || id as usize > len {
        return None;
    }
    Some(id as usize - 1)
}

fn validate_entry_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Validation("Entry text must not be empty".into()));
    }
    Ok(())
}

#[instrument]
pub async fn list_entries() -> Json<Vec<EntryResponse>> {
    Json(DEMO_ENTRIES.lock().await.clone())
}

/// Echo a would-be entry without storing it: creation never grows the
/// demo dataset.
#[instrument(skip(payload))]
pub async fn create_entry(
    Json(payload): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    validate_entry_text(&payload.entry)?;

    let now = OffsetDateTime::now_utc();
    let entry = EntryResponse {
        id: DEMO_ENTRIES.lock().await.len() as i64 + 1,
        entry: payload.entry,
        user_id: 0,
        created_on: now,
        last_edited_on: now,
    };
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument]
pub async fn get_entry(Path(id): Path<i64>) -> Result<Json<EntryResponse>, ApiError> {
    let entries = DEMO_ENTRIES.lock().await;
    let index = fixture_index(id, entries.len())
        .ok_or_else(|| ApiError::NotFound("Entry not found".into()))?;
    Ok(Json(entries[index].clone()))
}

/// Replace the entry text in place. The seeded timestamps are left as
/// they are.
#[instrument(skip(payload))]
pub async fn update_entry(
    Path(id): Path<i64>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    validate_entry_text(&payload.entry)?;

    let mut entries = DEMO_ENTRIES.lock().await;
    let index = fixture_index(id, entries.len())
        .ok_or_else(|| ApiError::NotFound("Entry not found".into()))?;
    entries[index].entry = payload.entry;
    Ok(Json(entries[index].clone()))
}

/// Bounds-checked no-op: a valid id answers 204 but the dataset never
/// shrinks, keeping the fixture ids stable.
#[instrument]
pub async fn delete_entry(Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    let entries = DEMO_ENTRIES.lock().await;
    fixture_index(id, entries.len()).ok_or_else(|| ApiError::NotFound("Entry not found".into()))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_holds_five_entries_with_sequential_ids() {
        let entries = DEMO_ENTRIES.lock().await;
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.id, i as i64 + 1);
            assert_eq!(entry.user_id, 0);
            assert_eq!(entry.created_on, entry.last_edited_on);
        }
    }

    #[test]
    fn fixture_index_accepts_only_ids_one_through_len() {
        assert_eq!(fixture_index(1, 5), Some(0));
        assert_eq!(fixture_index(5, 5), Some(4));
        assert_eq!(fixture_index(0, 5), None);
        assert_eq!(fixture_index(6, 5), None);
        assert_eq!(fixture_index(-1, 5), None);
    }

    #[tokio::test]
    async fn update_replaces_text_in_place_and_keeps_timestamps() {
        let updated = update_entry(
            Path(4),
            Json(NewEntryRequest {
                entry: "The fruit salad turned out even better than expected.".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.0.id, 4);
        assert_eq!(
            updated.0.entry,
            "The fruit salad turned out even better than expected."
        );
        assert_eq!(updated.0.created_on, updated.0.last_edited_on);

        // The mutation is visible on a subsequent read.
        let fetched = get_entry(Path(4)).await.unwrap();
        assert_eq!(fetched.0.entry, updated.0.entry);
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_ids_and_empty_text() {
        let err = update_entry(Path(6), Json(NewEntryRequest { entry: "x".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = update_entry(Path(1), Json(NewEntryRequest { entry: "  ".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_is_a_bounds_checked_no_op() {
        let status = delete_entry(Path(1)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        // The dataset is untouched.
        assert_eq!(DEMO_ENTRIES.lock().await.len(), 5);

        let err = delete_entry(Path(0)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
