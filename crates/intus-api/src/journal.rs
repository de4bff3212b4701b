use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::debug;
use uuid::Uuid;

use intus_db::models::{JournalChanges, JournalFilter, JournalRow};
use intus_types::api::{Claims, CreateJournalRequest, JournalQuery, OkResponse, UpdateJournalRequest};
use intus_types::models::JournalEntry;

use crate::error::ApiError;
use crate::rows;
use crate::state::AppState;
use crate::validation::{
    MAX_CONTENT_CHARS, MAX_TITLE_CHARS, check_length, clamp_take, normalize_tags, parse_mood, trimmed,
};

const NOT_FOUND: ApiError = ApiError::NotFound("Not found");

/// GET /journal?q=&tag=&take=
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<JournalQuery>, ApiError>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let filter = JournalFilter {
        query: trimmed(query.q),
        tag: trimmed(query.tag),
        limit: Some(clamp_take(query.take)),
    };

    let user_id = claims.sub.to_string();
    let rows = state.run_db(move |db| db.list_journal_entries(&user_id, &filter)).await?;

    Ok(Json(rows.into_iter().map(rows::journal_entry).collect()))
}

/// POST /journal
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateJournalRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let title = trimmed(req.title).ok_or_else(|| ApiError::bad_request("Title required"))?;
    check_length(&title, "Title", MAX_TITLE_CHARS)?;

    let content = trimmed(req.content).ok_or_else(|| ApiError::bad_request("Content required"))?;
    check_length(&content, "Content", MAX_CONTENT_CHARS)?;

    let mood = parse_mood(req.mood.as_deref())?;
    let tags = normalize_tags(req.tags.unwrap_or_default());

    let now = chrono::Utc::now();
    let row = JournalRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        title,
        content,
        mood,
        tags,
        created_at: now,
        updated_at: now,
    };

    let row = state
        .run_db(move |db| {
            db.insert_journal_entry(&row)?;
            Ok(row)
        })
        .await?;

    debug!("Journal entry {} created by {}", row.id, row.user_id);
    Ok((StatusCode::CREATED, Json(rows::journal_entry(row))))
}

/// GET /journal/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<JournalEntry>, ApiError> {
    let user_id = claims.sub.to_string();
    let row = state
        .run_db(move |db| db.get_journal_entry(&id.to_string(), &user_id))
        .await?
        .ok_or(NOT_FOUND)?;

    Ok(Json(rows::journal_entry(row)))
}

/// PATCH /journal/{id}
///
/// Only supplied fields change.
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateJournalRequest>, ApiError>,
) -> Result<Json<JournalEntry>, ApiError> {
    let changes = JournalChanges {
        title: trimmed(req.title),
        content: trimmed(req.content),
        mood: req.mood.as_deref().map(|m| parse_mood(Some(m))).transpose()?,
        tags: req.tags.map(normalize_tags),
    };

    if let Some(title) = &changes.title {
        check_length(title, "Title", MAX_TITLE_CHARS)?;
    }
    if let Some(content) = &changes.content {
        check_length(content, "Content", MAX_CONTENT_CHARS)?;
    }
    if changes.is_empty() {
        return Err(ApiError::bad_request("Nothing to update"));
    }

    let user_id = claims.sub.to_string();
    let now = chrono::Utc::now();
    let row = state
        .run_db(move |db| db.update_journal_entry(&id.to_string(), &user_id, &changes, now))
        .await?
        .ok_or(NOT_FOUND)?;

    Ok(Json(rows::journal_entry(row)))
}

/// DELETE /journal/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id = claims.sub.to_string();
    let removed = state
        .run_db(move |db| db.delete_journal_entry(&id.to_string(), &user_id))
        .await?;

    if !removed {
        return Err(NOT_FOUND);
    }
    Ok(Json(OkResponse { ok: true }))
}
