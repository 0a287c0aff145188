//! Error types for `stackit-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::vote::TargetKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("question not found: {0}")]
  QuestionNotFound(Uuid),

  #[error("answer not found: {0}")]
  AnswerNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("{kind} not found: {id}")]
  TargetNotFound { kind: TargetKind, id: Uuid },

  #[error("you cannot vote on your own {0}")]
  SelfVote(TargetKind),

  #[error("username already taken: {0}")]
  UsernameTaken(String),

  #[error("unknown role discriminant: {0:?}")]
  UnknownRole(String),

  #[error("unknown vote kind discriminant: {0:?}")]
  UnknownVoteKind(String),

  #[error("unknown target kind discriminant: {0:?}")]
  UnknownTargetKind(String),

  #[error("unknown notification kind discriminant: {0:?}")]
  UnknownNotificationKind(String),

  /// Opaque backend failure surfaced through the [`Into`] bound on
  /// [`ForumStore::Error`](crate::store::ForumStore::Error).
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
