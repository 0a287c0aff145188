//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`RegisterBody`]; returns 201 + profile |
//! | `GET`  | `/users/me` | The authenticated caller's profile |
//! | `PUT`  | `/users/{id}/role` | Admin only; body: `{"role":"user"}` |

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use stackit_core::{
  store::ForumStore,
  user::{NewUser, Role, User},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Profile ──────────────────────────────────────────────────────────────────

/// The public view of an account — everything except the password hash.
#[derive(Debug, Serialize)]
pub struct Profile {
  pub user_id:    Uuid,
  pub username:   String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

impl From<User> for Profile {
  fn from(u: User) -> Self {
    Self {
      user_id:    u.user_id,
      username:   u.username,
      role:       u.role,
      created_at: u.created_at,
    }
  }
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// `POST /users` — open registration. New accounts always get the `user`
/// role; elevation is a separate admin-only operation.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore + 'static,
{
  let username = body.username.trim();
  if username.is_empty() {
    return Err(ApiError::BadRequest("username is required".to_owned()));
  }
  if body.password.len() < 6 {
    return Err(ApiError::BadRequest(
      "password must be at least 6 characters".to_owned(),
    ));
  }

  let user = state
    .store
    .create_user(NewUser {
      username:      username.to_owned(),
      password_hash: hash_password(&body.password)?,
      role:          Role::User,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(Profile::from(user))))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Profile>, ApiError>
where
  S: ForumStore + 'static,
{
  let user = state
    .store
    .get_user(caller.user_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", caller.user_id)))?;
  Ok(Json(Profile::from(user)))
}

// ─── Role update ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /users/{id}/role` — admin only.
pub async fn set_role<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  if !caller.is_admin() {
    return Err(ApiError::Forbidden("admin role required".to_owned()));
  }
  state
    .store
    .set_user_role(id, body.role)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
