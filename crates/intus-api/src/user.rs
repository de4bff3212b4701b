use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};

use intus_db::is_unique_violation;
use intus_db::models::JournalFilter;
use intus_types::api::{
    Claims, ConversationDetail, PurgeRequest, PurgeResponse, UpdateProfileRequest, UserExport,
};
use intus_types::models::UserProfile;

use crate::error::ApiError;
use crate::rows;
use crate::state::AppState;
use crate::validation::{MAX_NAME_CHARS, is_valid_email, normalize_email, trimmed, truncate_chars};

/// Literal the caller must send to confirm an irreversible purge.
pub const PURGE_CONFIRMATION: &str = "BORRAR";

const USER_NOT_FOUND: ApiError = ApiError::NotFound("User not found");

/// GET /user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = claims.sub.to_string();
    let user = state
        .run_db(move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(USER_NOT_FOUND)?;

    Ok(Json(rows::user_profile(user)))
}

/// PATCH /user/profile
///
/// Update display name and/or email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<Json<UserProfile>, ApiError> {
    let name = trimmed(req.name).map(|n| truncate_chars(n, MAX_NAME_CHARS));
    let email = trimmed(req.email).map(|e| normalize_email(&e));

    if name.is_none() && email.is_none() {
        return Err(ApiError::bad_request("Nothing to update"));
    }
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
    }

    let user_id = claims.sub.to_string();
    let now = chrono::Utc::now();
    let updated = state
        .run_db(move |db| db.update_user_profile(&user_id, name.as_deref(), email.as_deref(), now))
        .await;

    match updated {
        Ok(Some(user)) => Ok(Json(rows::user_profile(user))),
        Ok(None) => Err(USER_NOT_FOUND),
        Err(ApiError::Internal(e)) if is_unique_violation(&e) => Err(ApiError::Conflict("Email already in use")),
        Err(e) => Err(e),
    }
}

/// GET /user/export
///
/// Everything the caller owns, in one document.
pub async fn export_data(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserExport>, ApiError> {
    let user_id = claims.sub.to_string();
    let export = state
        .run_db(move |db| {
            let Some(user) = db.get_user_by_id(&user_id)? else {
                return Ok(None);
            };
            let journal = db.list_journal_entries(&user_id, &JournalFilter::default())?;
            let check_ins = db.list_check_ins(&user_id, None)?;

            let mut conversations = Vec::new();
            for conversation in db.list_conversations(&user_id)? {
                let messages = db.list_messages(&conversation.id, &user_id)?;
                conversations.push(ConversationDetail {
                    conversation: rows::conversation(conversation),
                    messages: messages.into_iter().map(rows::message).collect(),
                });
            }

            Ok(Some(UserExport {
                profile: rows::user_profile(user),
                journal: journal.into_iter().map(rows::journal_entry).collect(),
                check_ins: check_ins.into_iter().map(rows::check_in).collect(),
                conversations,
            }))
        })
        .await?
        .ok_or(USER_NOT_FOUND)?;

    Ok(Json(export))
}

/// POST /user/purge
///
/// `wipeDataOnly: true` keeps the account and removes everything it owns;
/// otherwise the account goes too. Both run in one transaction.
pub async fn purge(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<PurgeRequest>, ApiError>,
) -> Result<Json<PurgeResponse>, ApiError> {
    if req.confirm.as_deref() != Some(PURGE_CONFIRMATION) {
        return Err(ApiError::bad_request(format!(
            "Confirmation required: confirm must be \"{PURGE_CONFIRMATION}\""
        )));
    }

    let user_id = claims.sub.to_string();
    if req.wipe_data_only.unwrap_or(false) {
        let uid = user_id.clone();
        let counts = state.run_db(move |db| db.wipe_user_data(&uid)).await?;
        info!(
            "Wiped data for user {}: {} journal entries, {} check-ins, {} conversations, {} messages",
            user_id, counts.journal_entries, counts.check_ins, counts.conversations, counts.messages
        );
        return Ok(Json(PurgeResponse { ok: true, deleted_user: false }));
    }

    let uid = user_id.clone();
    if !state.run_db(move |db| db.delete_user(&uid)).await? {
        warn!("Purge requested for user {} which no longer exists", user_id);
        return Err(USER_NOT_FOUND);
    }

    info!("Deleted user {} and all owned data", user_id);
    Ok(Json(PurgeResponse { ok: true, deleted_user: true }))
}
