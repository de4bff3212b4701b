use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CheckIn, Conversation, JournalEntry, Message, UserProfile};

// -- JWT Claims --

/// Claims carried by the session token. The canonical identity is `sub`;
/// `email` and `name` are a snapshot refreshed via `/auth/session/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub exp: usize,
}

// -- Auth --

/// Request bodies keep their fields loose (`Option<String>`) so handlers can
/// answer with a field-specific validation message instead of a generic
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

// -- Journal --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateJournalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateJournalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub take: Option<i64>,
}

// -- Check-ins --

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCheckInRequest {
    pub mood: Option<String>,
    pub stress_level: Option<i64>,
    pub energy_level: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCheckInRequest {
    pub mood: Option<String>,
    pub stress_level: Option<i64>,
    pub energy_level: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInQuery {
    pub days: Option<i64>,
}

// -- Chat --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

/// The stored user message together with the assistant's reply.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: Message,
    pub reply: Message,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

// -- Catalog --

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// -- User --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurgeRequest {
    pub confirm: Option<String>,
    pub wipe_data_only: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub ok: bool,
    pub deleted_user: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExport {
    pub profile: UserProfile,
    pub journal: Vec<JournalEntry>,
    pub check_ins: Vec<CheckIn>,
    pub conversations: Vec<ConversationDetail>,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
