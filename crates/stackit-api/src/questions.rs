//! Handlers for `/questions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/questions` | Optional `?limit=&offset=` |
//! | `POST`   | `/questions` | Body: [`NewQuestionBody`]; returns 201 |
//! | `GET`    | `/questions/{id}` | Bumps the view counter; includes the caller's vote when authenticated |
//! | `PUT`    | `/questions/{id}` | Owner or admin |
//! | `DELETE` | `/questions/{id}` | Owner or admin |
//! | `POST`   | `/questions/{id}/accept/{answer_id}` | Question author only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use stackit_core::{
  question::{NewQuestion, Question},
  store::{ForumStore, Page},
  vote::{TargetKind, TargetRef, VoteKind},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Caller, MaybeCaller},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl ListParams {
  pub fn page(&self) -> Page {
    let defaults = Page::default();
    Page {
      limit:  self.limit.unwrap_or(defaults.limit),
      offset: self.offset.unwrap_or(defaults.offset),
    }
  }
}

/// `GET /questions[?limit=&offset=]` — newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Question>>, ApiError>
where
  S: ForumStore + 'static,
{
  let questions = state
    .store
    .list_questions(params.page())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(questions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewQuestionBody {
  pub title: String,
  pub body:  String,
}

/// `POST /questions` — returns 201 + the stored question.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<NewQuestionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore + 'static,
{
  caller.require_contributor()?;
  if body.title.trim().is_empty() || body.body.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "title and body are required".to_owned(),
    ));
  }

  let question = state
    .store
    .add_question(NewQuestion {
      user_id: caller.user_id,
      title:   body.title,
      body:    body.body,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(question)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// A question plus the caller's own vote on it, if any.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
  #[serde(flatten)]
  pub question:    Question,
  pub caller_vote: Option<VoteKind>,
}

/// `GET /questions/{id}` — bumps the view counter. Anonymous reads are
/// fine; an authenticated caller also sees their current vote.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  MaybeCaller(caller): MaybeCaller,
  Path(id): Path<Uuid>,
) -> Result<Json<QuestionDetail>, ApiError>
where
  S: ForumStore + 'static,
{
  let question = state
    .store
    .view_question(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("question {id} not found")))?;

  let caller_vote = match caller {
    Some(caller) => {
      let target = TargetRef { kind: TargetKind::Question, id };
      state
        .store
        .votes_for(caller.user_id, &[target])
        .await
        .map_err(ApiError::from_store)?
        .first()
        .map(|v| v.kind)
    }
    None => None,
  };

  Ok(Json(QuestionDetail { question, caller_vote }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionBody {
  pub title: String,
  pub body:  String,
}

/// `PUT /questions/{id}` — owner or admin.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateQuestionBody>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let question = state
    .store
    .get_question(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("question {id} not found")))?;

  if !caller.may_edit(question.user_id) {
    return Err(ApiError::Forbidden(
      "you can only modify your own content".to_owned(),
    ));
  }

  state
    .store
    .update_question(id, body.title, body.body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /questions/{id}` — owner or admin. Answers and vote rows go
/// with it.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let question = state
    .store
    .get_question(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("question {id} not found")))?;

  if !caller.may_edit(question.user_id) {
    return Err(ApiError::Forbidden(
      "you can only modify your own content".to_owned(),
    ));
  }

  state
    .store
    .delete_question(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Accept answer ────────────────────────────────────────────────────────────

/// `POST /questions/{id}/accept/{answer_id}` — only the question author
/// may accept; admins get no bypass here.
pub async fn accept<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path((id, answer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let question = state
    .store
    .get_question(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("question {id} not found")))?;

  if question.user_id != caller.user_id {
    return Err(ApiError::Forbidden(
      "only the question author can accept answers".to_owned(),
    ));
  }

  state
    .store
    .accept_answer(id, answer_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
