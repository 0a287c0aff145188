//! Best-effort notification emission.
//!
//! Handlers emit events after the triggering operation has committed. The
//! [`Notifier`] decides whether and to whom a notification fires; writing
//! it is never part of the operation's transactional guarantee, and any
//! failure here is logged and swallowed.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  notification::{NewNotification, NotificationKind},
  store::ForumStore,
  vote::{TargetRef, VoteAction, VoteKind},
};

// ─── Events ──────────────────────────────────────────────────────────────────

/// A vote was applied to the ledger.
#[derive(Debug, Clone, Copy)]
pub struct VoteCast {
  pub voter_id:     Uuid,
  pub target:       TargetRef,
  pub target_owner: Uuid,
  pub kind:         VoteKind,
  pub action:       VoteAction,
}

impl VoteCast {
  /// Whether this event notifies the target owner.
  ///
  /// Only a vote that ends as an upvote notifies — a toggle-off never
  /// does, and downvotes are deliberately silent. The ledger rejects
  /// self-votes upstream, but the self-notification guard is kept so the
  /// rule holds for any event source.
  pub fn notifies_owner(&self) -> bool {
    self.kind == VoteKind::Upvote
      && self.action != VoteAction::Removed
      && self.target_owner != self.voter_id
  }
}

/// An answer was posted under a question.
#[derive(Debug, Clone, Copy)]
pub struct AnswerPosted {
  pub author_id:      Uuid,
  pub question_owner: Uuid,
  pub answer_id:      Uuid,
}

impl AnswerPosted {
  /// Answering your own question is not news.
  pub fn notifies_owner(&self) -> bool {
    self.question_owner != self.author_id
  }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Consumes domain events and writes notifications for affected users.
pub struct Notifier<S> {
  store: Arc<S>,
}

impl<S: ForumStore> Notifier<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// React to a committed vote. Never fails the caller.
  pub async fn vote_cast(&self, event: VoteCast) {
    if !event.notifies_owner() {
      return;
    }
    let Some(actor) = self.actor_name(event.voter_id).await else {
      return;
    };
    self
      .write(NewNotification {
        user_id:    event.target_owner,
        kind:       NotificationKind::Vote,
        message:    format!("{actor} upvoted your {}", event.target.kind),
        related_id: Some(event.target.id),
      })
      .await;
  }

  /// React to a posted answer. Never fails the caller.
  pub async fn answer_posted(&self, event: AnswerPosted) {
    if !event.notifies_owner() {
      return;
    }
    let Some(actor) = self.actor_name(event.author_id).await else {
      return;
    };
    self
      .write(NewNotification {
        user_id:    event.question_owner,
        kind:       NotificationKind::Answer,
        message:    format!("{actor} answered your question"),
        related_id: Some(event.answer_id),
      })
      .await;
  }

  /// Resolve the acting user's display name; `None` suppresses emission.
  async fn actor_name(&self, actor_id: Uuid) -> Option<String> {
    match self.store.get_user(actor_id).await {
      Ok(user) => user.map(|u| u.username),
      Err(e) => {
        tracing::warn!(%actor_id, error = %e, "notification actor lookup failed");
        None
      }
    }
  }

  async fn write(&self, input: NewNotification) {
    let recipient = input.user_id;
    if let Err(e) = self.store.add_notification(input).await {
      tracing::warn!(%recipient, error = %e, "notification write failed");
    }
  }
}
