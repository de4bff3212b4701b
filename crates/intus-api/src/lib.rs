pub mod auth;
pub mod catalog;
pub mod chat;
pub mod check_ins;
pub mod error;
pub mod journal;
pub mod middleware;
pub mod responder;
pub mod rows;
pub mod state;
pub mod user;
pub mod validation;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;

/// All HTTP routes. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/scenarios", get(catalog::list_scenarios))
        .route("/scenarios/{id}", get(catalog::get_scenario))
        .route("/tools", get(catalog::list_tools))
        .route("/tools/{id}", get(catalog::get_tool))
        .route("/resources", get(catalog::list_resources));

    let protected_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/auth/session/refresh", post(auth::refresh_session))
        .route("/checkins", get(check_ins::list_check_ins).post(check_ins::create_check_in))
        .route(
            "/checkins/{id}",
            get(check_ins::get_check_in)
                .patch(check_ins::update_check_in)
                .delete(check_ins::delete_check_in),
        )
        .route("/journal", get(journal::list_entries).post(journal::create_entry))
        .route(
            "/journal/{id}",
            get(journal::get_entry).patch(journal::update_entry).delete(journal::delete_entry),
        )
        .route("/chat/conversations", get(chat::list_conversations).post(chat::create_conversation))
        .route(
            "/chat/conversations/{id}",
            get(chat::get_conversation).delete(chat::delete_conversation),
        )
        .route("/chat/conversations/{id}/messages", post(chat::send_message))
        .route("/user/profile", get(user::get_profile).patch(user::update_profile))
        .route("/user/export", get(user::export_data))
        .route("/user/purge", post(user::purge))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
