//! Answers posted under questions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An answer as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
  pub answer_id:   Uuid,
  pub question_id: Uuid,
  /// Owner; gates update/delete and disqualifies the owner from voting.
  pub user_id:     Uuid,
  pub content:     String,
  /// Denormalized signed sum of this answer's vote rows.
  pub votes:       i64,
  /// At most one answer per question is accepted at a time.
  pub is_accepted: bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ForumStore::add_answer`].
#[derive(Debug, Clone)]
pub struct NewAnswer {
  pub question_id: Uuid,
  pub user_id:     Uuid,
  pub content:     String,
}
