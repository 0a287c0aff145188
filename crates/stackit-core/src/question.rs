//! Questions — the root content entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A question as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
  pub question_id:        Uuid,
  /// Owner; gates update/delete and disqualifies the owner from voting.
  pub user_id:            Uuid,
  pub title:              String,
  pub body:               String,
  pub accepted_answer_id: Option<Uuid>,
  /// Denormalized signed sum of this question's vote rows. Maintained by
  /// the vote ledger, never recomputed.
  pub votes:              i64,
  pub view_count:         i64,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

/// Input to [`crate::store::ForumStore::add_question`].
#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub user_id: Uuid,
  pub title:   String,
  pub body:    String,
}
