use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use intus_db::models::{CheckInChanges, CheckInRow};
use intus_types::api::{CheckInQuery, Claims, CreateCheckInRequest, OkResponse, UpdateCheckInRequest};
use intus_types::models::CheckIn;

use crate::error::ApiError;
use crate::rows;
use crate::state::AppState;
use crate::validation::{MAX_NOTE_CHARS, clamp_days, parse_level, parse_mood, trimmed, truncate_chars};

const NOT_FOUND: ApiError = ApiError::NotFound("Not found");

/// GET /checkins?days=N
///
/// The last N days, oldest first.
pub async fn list_check_ins(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<CheckInQuery>, ApiError>,
) -> Result<Json<Vec<CheckIn>>, ApiError> {
    let since = chrono::Utc::now() - chrono::Duration::days(clamp_days(query.days));

    let user_id = claims.sub.to_string();
    let rows = state.run_db(move |db| db.list_check_ins(&user_id, Some(since))).await?;

    Ok(Json(rows.into_iter().map(rows::check_in).collect()))
}

/// POST /checkins
pub async fn create_check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateCheckInRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let mood = parse_mood(req.mood.as_deref())?;
    let stress_level = parse_level(req.stress_level, "stressLevel")?;
    let energy_level = parse_level(req.energy_level, "energyLevel")?;
    let note = trimmed(req.note).map(|n| truncate_chars(n, MAX_NOTE_CHARS));

    let row = CheckInRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        mood,
        stress_level,
        energy_level,
        note,
        created_at: chrono::Utc::now(),
    };

    let row = state
        .run_db(move |db| {
            db.insert_check_in(&row)?;
            Ok(row)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(rows::check_in(row))))
}

/// GET /checkins/{id}
pub async fn get_check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<CheckIn>, ApiError> {
    let user_id = claims.sub.to_string();
    let row = state
        .run_db(move |db| db.get_check_in(&id.to_string(), &user_id))
        .await?
        .ok_or(NOT_FOUND)?;

    Ok(Json(rows::check_in(row)))
}

/// PATCH /checkins/{id}
pub async fn update_check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateCheckInRequest>, ApiError>,
) -> Result<Json<CheckIn>, ApiError> {
    let changes = CheckInChanges {
        mood: req.mood.as_deref().map(|m| parse_mood(Some(m))).transpose()?,
        stress_level: req
            .stress_level
            .map(|l| parse_level(Some(l), "stressLevel"))
            .transpose()?,
        energy_level: req
            .energy_level
            .map(|l| parse_level(Some(l), "energyLevel"))
            .transpose()?,
        note: trimmed(req.note).map(|n| truncate_chars(n, MAX_NOTE_CHARS)),
    };

    if changes.is_empty() {
        return Err(ApiError::bad_request("Nothing to update"));
    }

    let user_id = claims.sub.to_string();
    let row = state
        .run_db(move |db| db.update_check_in(&id.to_string(), &user_id, &changes))
        .await?
        .ok_or(NOT_FOUND)?;

    Ok(Json(rows::check_in(row)))
}

/// DELETE /checkins/{id}
pub async fn delete_check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id = claims.sub.to_string();
    let removed = state
        .run_db(move |db| db.delete_check_in(&id.to_string(), &user_id))
        .await?;

    if !removed {
        return Err(NOT_FOUND);
    }
    Ok(Json(OkResponse { ok: true }))
}
