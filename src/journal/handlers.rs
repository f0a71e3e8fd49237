use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::{info, instrument};

use crate::auth::extractors::BearerUser;
use crate::error::ApiError;
use crate::journal::dto::{EntryResponse, NewEntryRequest};
use crate::journal::repo::Entry;
use crate::state::AppState;

fn validate_entry_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Validation("Entry text must not be empty".into()));
    }
    Ok(())
}

#[instrument(skip(state, caller))]
pub async fn list_entries(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let entries = Entry::list_by_user(&state.db, caller.id).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
    Json(payload): Json<NewEntryRequest>,
) -> Result<(StatusCode, HeaderMap, Json<EntryResponse>), ApiError> {
    validate_entry_text(&payload.entry)?;

    let entry = Entry::create(&state.db, caller.id, &payload.entry).await?;
    info!(user_id = caller.id, entry_id = entry.id, "journal entry created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/journal/{}", entry.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(entry.into())))
}

#[instrument(skip(state, caller))]
pub async fn get_entry(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
    Path(id): Path<i64>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = Entry::get(&state.db, caller.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Entry not found".into()))?;
    Ok(Json(entry.into()))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
    Path(id): Path<i64>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    validate_entry_text(&payload.entry)?;

    let entry = Entry::update(&state.db, caller.id, id, &payload.entry)
        .await?
        .ok_or_else(|| ApiError::NotFound("Entry not found".into()))?;
    info!(user_id = caller.id, entry_id = entry.id, "journal entry updated");
    Ok(Json(entry.into()))
}

#[instrument(skip(state, caller))]
pub async fn delete_entry(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = Entry::delete(&state.db, caller.id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("Entry not found".into()));
    }
    info!(user_id = caller.id, entry_id = id, "journal entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_text_must_not_be_empty_or_whitespace() {
        assert!(validate_entry_text("Had coffee").is_ok());
        assert!(validate_entry_text("").is_err());
        assert!(validate_entry_text("   \n\t").is_err());
    }
}
