//! Handlers for `/notifications` endpoints. Everything here is scoped to
//! the authenticated recipient.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/notifications` | Optional `?unread_only=&kind=&limit=&offset=` |
//! | `GET`    | `/notifications/unread-count` | |
//! | `POST`   | `/notifications/{id}/read` | 404 unless owned by the caller |
//! | `POST`   | `/notifications/read-all` | |
//! | `DELETE` | `/notifications/{id}` | 404 unless owned by the caller |
//! | `DELETE` | `/notifications` | Deletes all of the caller's notifications |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use stackit_core::{
  notification::{Notification, NotificationKind},
  store::{ForumStore, NotificationQuery, Page},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  #[serde(default)]
  pub unread_only: bool,
  pub kind:        Option<NotificationKind>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

/// `GET /notifications[?unread_only=true][&kind=vote][&limit=&offset=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: ForumStore + 'static,
{
  let defaults = Page::default();
  let query = NotificationQuery {
    unread_only: params.unread_only,
    kind:        params.kind,
    page:        Page {
      limit:  params.limit.unwrap_or(defaults.limit),
      offset: params.offset.unwrap_or(defaults.offset),
    },
  };

  let notifications = state
    .store
    .notifications_for(caller.user_id, query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(notifications))
}

// ─── Unread count ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UnreadCount {
  pub unread: u64,
}

/// `GET /notifications/unread-count`
pub async fn unread_count<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<UnreadCount>, ApiError>
where
  S: ForumStore + 'static,
{
  let unread = state
    .store
    .unread_count(caller.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(UnreadCount { unread }))
}

// ─── Read-state toggles ───────────────────────────────────────────────────────

/// `POST /notifications/{id}/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let found = state
    .store
    .mark_read(caller.user_id, id)
    .await
    .map_err(ApiError::from_store)?;
  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("notification {id} not found")))
  }
}

#[derive(Debug, Serialize)]
pub struct MarkedAll {
  pub marked: u64,
}

/// `POST /notifications/read-all`
pub async fn read_all<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<MarkedAll>, ApiError>
where
  S: ForumStore + 'static,
{
  let marked = state
    .store
    .mark_all_read(caller.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(MarkedAll { marked }))
}

// ─── Deletion ─────────────────────────────────────────────────────────────────

/// `DELETE /notifications/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let found = state
    .store
    .delete_notification(caller.user_id, id)
    .await
    .map_err(ApiError::from_store)?;
  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("notification {id} not found")))
  }
}

#[derive(Debug, Serialize)]
pub struct DeletedAll {
  pub deleted: u64,
}

/// `DELETE /notifications`
pub async fn delete_all<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<DeletedAll>, ApiError>
where
  S: ForumStore + 'static,
{
  let deleted = state
    .store
    .delete_all_notifications(caller.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(DeletedAll { deleted }))
}
