use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use intus_db::is_unique_violation;
use intus_db::models::UserRow;
use intus_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserSummary};

use crate::error::ApiError;
use crate::rows;
use crate::state::{AppState, blocking};
use crate::validation::{
    MAX_NAME_CHARS, MIN_PASSWORD_CHARS, is_valid_email, normalize_email, trimmed, truncate_chars,
};

/// Verified against when the email is unknown.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("intus-no-such-account").ok());

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }

    let password = req.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    let name = trimmed(req.name).map(|n| truncate_chars(n, MAX_NAME_CHARS));

    // Check if email is taken
    let lookup = email.clone();
    if state.run_db(move |db| db.get_user_by_email(&lookup)).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use"));
    }

    let password_hash = blocking(move || hash_password(&password)).await?;

    let user_id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now();
    let created = state
        .run_db(move |db| db.create_user(&user_id, &email, name.as_deref(), &password_hash, now))
        .await;

    let user = match created {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same address.
        Err(ApiError::Internal(e)) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Email already in use"));
        }
        Err(e) => return Err(e),
    };

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(rows::user_summary(&user))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state.run_db(move |db| db.get_user_by_email(&email)).await?;

    // Unknown emails still pay for one Argon2 verify so response time does not
    // reveal which accounts exist.
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(&password, dummy)?;
            }
            Ok(false)
        }
    })
    .await?;

    let user = match user {
        Some(user) if verified => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = create_token(&state.jwt_secret, state.token_ttl, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: rows::user_summary(&user),
    }))
}

/// GET /auth/session
///
/// The identity carried by the caller's token.
pub async fn session(Extension(claims): Extension<Claims>) -> Json<UserSummary> {
    Json(UserSummary {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}

/// POST /auth/session/refresh
///
/// Reissue the token from the current user row
/// so name/email changes show up without logging in again.
pub async fn refresh_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user_id = claims.sub.to_string();
    let user = state
        .run_db(move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, state.token_ttl, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: rows::user_summary(&user),
    }))
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("stored password hash is invalid: {}", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn create_token(secret: &str, ttl: chrono::Duration, user: &UserRow) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id.parse()?,
        email: user.email.clone(),
        name: user.name.clone(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::decode_token;

    fn user_row() -> UserRow {
        let now = chrono::Utc::now();
        UserRow {
            id: Uuid::new_v4().to_string(),
            email: "ana@ejemplo.com".into(),
            name: Some("Ana".into()),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original_password() {
        let hash = hash_password("Password123!").unwrap();
        assert!(verify_password("Password123!", &hash).unwrap());
        assert!(!verify_password("password123!", &hash).unwrap());
    }

    #[test]
    fn dummy_hash_is_usable_and_matches_nothing_real() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash is generated");
        assert!(!verify_password("password123", dummy).unwrap());
        assert!(!verify_password("", dummy).unwrap());
    }

    #[test]
    fn token_round_trips_with_the_right_secret_only() {
        let user = user_row();
        let token = create_token("secret-a", chrono::Duration::days(1), &user).unwrap();

        let claims = decode_token("secret-a", &token).unwrap();
        assert_eq!(claims.sub.to_string(), user.id);
        assert_eq!(claims.email, "ana@ejemplo.com");
        assert_eq!(claims.name.as_deref(), Some("Ana"));

        assert!(decode_token("secret-b", &token).is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let user = user_row();
        let token = create_token("secret", chrono::Duration::days(-1), &user).unwrap();
        assert!(decode_token("secret", &token).is_none());
    }
}
