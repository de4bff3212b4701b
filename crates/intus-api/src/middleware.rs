use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use intus_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// Extract and validate the JWT from the Authorization header, confirm the
/// subject still exists, and hand the claims to the handler as an extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.jwt_secret, token).ok_or(ApiError::Unauthorized)?;

    // A purged account keeps a cryptographically valid token until it expires.
    let user_id = claims.sub.to_string();
    if !state.run_db(move |db| db.user_exists(&user_id)).await? {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
