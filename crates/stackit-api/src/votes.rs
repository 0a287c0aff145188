//! Handlers for `/votes` endpoints — the vote ledger's HTTP surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/votes` | Body: [`CastVoteBody`]; toggle/switch semantics |
//! | `POST` | `/votes/bulk` | Body: `{"targets":[{"kind":"question","id":"…"}]}` |
//! | `GET`  | `/votes/stats` | The caller's voting totals |

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use stackit_core::{
  notify::VoteCast,
  store::ForumStore,
  vote::{TargetKind, TargetRef, Vote, VoteAction, VoteKind, VoteStats},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Cast ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CastVoteBody {
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
  pub vote_kind:   VoteKind,
}

#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
  pub action:      VoteAction,
  /// Net change applied to the target's vote counter.
  pub vote_change: i64,
  pub message:     String,
}

/// `POST /votes` — cast, switch, or toggle off a vote.
///
/// Re-casting the same kind removes the vote; this is the intended UX,
/// not an idempotent upsert. The upvote notification fires after the
/// ledger has committed and never affects the response.
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CastVoteBody>,
) -> Result<Json<CastVoteResponse>, ApiError>
where
  S: ForumStore + 'static,
{
  caller.require_contributor()?;

  let target = TargetRef { kind: body.target_kind, id: body.target_id };
  let receipt = state
    .store
    .cast_vote(caller.user_id, target, body.vote_kind)
    .await
    .map_err(ApiError::from_store)?;

  state
    .notifier
    .vote_cast(VoteCast {
      voter_id:     caller.user_id,
      target,
      target_owner: receipt.target_owner,
      kind:         receipt.kind,
      action:       receipt.action,
    })
    .await;

  Ok(Json(CastVoteResponse {
    action:      receipt.action,
    vote_change: receipt.delta,
    message:     format!("vote {} successfully", receipt.action),
  }))
}

// ─── Bulk status ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BulkVotesBody {
  pub targets: Vec<TargetRef>,
}

/// `POST /votes/bulk` — the caller's current votes on the given targets.
/// Targets without a vote are absent from the response.
pub async fn bulk<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<BulkVotesBody>,
) -> Result<Json<Vec<Vote>>, ApiError>
where
  S: ForumStore + 'static,
{
  let votes = state
    .store
    .votes_for(caller.user_id, &body.targets)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(votes))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /votes/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<VoteStats>, ApiError>
where
  S: ForumStore + 'static,
{
  let stats = state
    .store
    .vote_stats(caller.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
