//! Handlers for answer endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/questions/{id}/answers` | Accepted first, then by votes |
//! | `POST`   | `/questions/{id}/answers` | Body: `{"content":"..."}`; returns 201 |
//! | `PUT`    | `/answers/{id}` | Owner or admin |
//! | `DELETE` | `/answers/{id}` | Owner or admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stackit_core::{
  answer::{Answer, NewAnswer},
  notify::AnswerPosted,
  store::ForumStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /questions/{id}/answers`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(question_id): Path<Uuid>,
) -> Result<Json<Vec<Answer>>, ApiError>
where
  S: ForumStore + 'static,
{
  if state
    .store
    .get_question(question_id)
    .await
    .map_err(ApiError::from_store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!(
      "question {question_id} not found"
    )));
  }

  let answers = state
    .store
    .answers_for(question_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(answers))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewAnswerBody {
  pub content: String,
}

/// `POST /questions/{id}/answers` — returns 201 + the stored answer and
/// notifies the question author as a post-commit side effect.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(question_id): Path<Uuid>,
  Json(body): Json<NewAnswerBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore + 'static,
{
  caller.require_contributor()?;
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("content is required".to_owned()));
  }

  let question = state
    .store
    .get_question(question_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("question {question_id} not found"))
    })?;

  let answer = state
    .store
    .add_answer(NewAnswer {
      question_id,
      user_id: caller.user_id,
      content: body.content,
    })
    .await
    .map_err(ApiError::from_store)?;

  state
    .notifier
    .answer_posted(AnswerPosted {
      author_id:      caller.user_id,
      question_owner: question.user_id,
      answer_id:      answer.answer_id,
    })
    .await;

  Ok((StatusCode::CREATED, Json(answer)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateAnswerBody {
  pub content: String,
}

/// `PUT /answers/{id}` — owner or admin.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateAnswerBody>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let answer = state
    .store
    .get_answer(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("answer {id} not found")))?;

  if !caller.may_edit(answer.user_id) {
    return Err(ApiError::Forbidden(
      "you can only modify your own content".to_owned(),
    ));
  }

  state
    .store
    .update_answer(id, body.content)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /answers/{id}` — owner or admin.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ForumStore + 'static,
{
  let answer = state
    .store
    .get_answer(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("answer {id} not found")))?;

  if !caller.may_edit(answer.user_id) {
    return Err(ApiError::Forbidden(
      "you can only modify your own content".to_owned(),
    ));
  }

  state
    .store
    .delete_answer(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
