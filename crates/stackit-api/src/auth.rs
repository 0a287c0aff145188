//! HTTP Basic-auth extractors — the authorization gate.
//!
//! Authentication resolves the acting identity against the user store;
//! ownership and role checks live on [`Caller`] and are applied by the
//! handlers that mutate resources.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use stackit_core::{store::ForumStore, user::Role};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Caller ──────────────────────────────────────────────────────────────────

/// The authenticated identity acting on a request.
#[derive(Debug, Clone)]
pub struct Caller {
  pub user_id:  Uuid,
  pub username: String,
  pub role:     Role,
}

impl Caller {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  /// Admins may touch anything; everyone else only their own resources.
  pub fn may_edit(&self, owner: Uuid) -> bool {
    self.is_admin() || self.user_id == owner
  }

  /// Guests are read-only.
  pub fn require_contributor(&self) -> Result<(), ApiError> {
    if self.role.can_contribute() {
      Ok(())
    } else {
      Err(ApiError::Forbidden(
        "guests cannot post or vote".to_owned(),
      ))
    }
  }
}

// ─── Credential resolution ───────────────────────────────────────────────────

/// Resolve Basic credentials against the user store.
///
/// Every failure mode — missing header, malformed encoding, unknown user,
/// wrong password — collapses to `Unauthorized` so the response does not
/// leak which part was wrong.
pub async fn resolve_caller<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Caller, ApiError>
where
  S: ForumStore,
{
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let user = store
    .user_by_username(username)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Caller {
    user_id:  user.user_id,
    username: user.username,
    role:     user.role,
  })
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: ForumStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_caller(&parts.headers, state.store.as_ref()).await
  }
}

// ─── MaybeCaller ─────────────────────────────────────────────────────────────

/// Optional authentication for endpoints that also serve anonymous reads.
///
/// No credentials means anonymous; credentials that fail to verify are
/// still rejected with 401 rather than silently downgraded.
pub struct MaybeCaller(pub Option<Caller>);

impl<S> FromRequestParts<AppState<S>> for MaybeCaller
where
  S: ForumStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if !parts.headers.contains_key(header::AUTHORIZATION) {
      return Ok(Self(None));
    }
    resolve_caller(&parts.headers, state.store.as_ref())
      .await
      .map(|caller| Self(Some(caller)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::Request;
  use rand_core::OsRng;
  use stackit_core::user::NewUser;
  use stackit_store_sqlite::SqliteStore;

  async fn state_with_user(
    username: &str,
    password: &str,
  ) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    store
      .create_user(NewUser {
        username:      username.to_owned(),
        password_hash: hash,
        role:          Role::User,
      })
      .await
      .unwrap();
    AppState::new(Arc::new(store))
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<Caller, ApiError> {
    let (mut parts, _) = req.into_parts();
    Caller::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = state_with_user("alice", "secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("alice", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    let caller = extract(req, &state).await.unwrap();
    assert_eq!(caller.username, "alice");
    assert_eq!(caller.role, Role::User);
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = state_with_user("alice", "secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("alice", "wrong"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = state_with_user("alice", "secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("mallory", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = state_with_user("alice", "secret").await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = state_with_user("alice", "secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn maybe_caller_allows_anonymous_but_not_bad_credentials() {
    let state = state_with_user("alice", "secret").await;

    let anon = Request::builder().body(axum::body::Body::empty()).unwrap();
    let (mut parts, _) = anon.into_parts();
    let MaybeCaller(resolved) =
      MaybeCaller::from_request_parts(&mut parts, &state).await.unwrap();
    assert!(resolved.is_none());

    let bad = Request::builder()
      .header(header::AUTHORIZATION, basic("alice", "wrong"))
      .body(axum::body::Body::empty())
      .unwrap();
    let (mut parts, _) = bad.into_parts();
    assert!(matches!(
      MaybeCaller::from_request_parts(&mut parts, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }
}
