//! Vote types and the ledger transition function.
//!
//! A user holds at most one vote per target. Re-casting the same kind
//! removes the vote (toggle-off); casting the opposite kind switches it.
//! Every transition carries the counter delta that keeps the target's
//! denormalized `votes` column equal to the signed sum of its vote rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Targets ─────────────────────────────────────────────────────────────────

/// What a vote can be cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
  Question,
  Answer,
}

impl fmt::Display for TargetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Question => "question",
      Self::Answer => "answer",
    })
  }
}

/// A votable entity: kind discriminator plus id.
///
/// The reference is weak — there is no owning pointer to the target row,
/// and deleting the target removes the vote rows with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
  pub kind: TargetKind,
  pub id:   Uuid,
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
  Upvote,
  Downvote,
}

impl VoteKind {
  /// Contribution of one vote of this kind to a target's counter.
  pub fn weight(self) -> i64 {
    match self {
      Self::Upvote => 1,
      Self::Downvote => -1,
    }
  }
}

/// How a cast changed the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
  Added,
  /// Toggle-off: the same kind was re-cast and the row was deleted.
  Removed,
  Changed,
}

impl fmt::Display for VoteAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Added => "added",
      Self::Removed => "removed",
      Self::Changed => "changed",
    })
  }
}

/// A persisted vote row.
#[derive(Debug, Clone, Serialize)]
pub struct Vote {
  pub vote_id:    Uuid,
  pub user_id:    Uuid,
  pub target:     TargetRef,
  pub kind:       VoteKind,
  pub created_at: DateTime<Utc>,
}

/// Result of a successful [`cast_vote`](crate::store::ForumStore::cast_vote).
#[derive(Debug, Clone, Copy)]
pub struct VoteReceipt {
  pub action:       VoteAction,
  /// Net change applied to the target's counter.
  pub delta:        i64,
  /// The kind the cast asked for — the held kind after the cast, unless
  /// the action was `Removed`.
  pub kind:         VoteKind,
  /// Owner of the target; the candidate notification recipient.
  pub target_owner: Uuid,
}

/// Per-user voting totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VoteStats {
  pub total:          u64,
  pub upvotes:        u64,
  pub downvotes:      u64,
  pub question_votes: u64,
  pub answer_votes:   u64,
}

// ─── Transition ──────────────────────────────────────────────────────────────

/// Classify a cast against the existing ledger row and return the action
/// together with the counter delta.
///
/// | existing | requested | action  | delta |
/// |----------|-----------|---------|-------|
/// | none     | up        | Added   | +1    |
/// | none     | down      | Added   | −1    |
/// | up       | up        | Removed | −1    |
/// | down     | down      | Removed | +1    |
/// | up       | down      | Changed | −2    |
/// | down     | up        | Changed | +2    |
///
/// The magnitude-2 delta on a switch is intentional: flipping a downvote to
/// an upvote both removes a −1 and adds a +1.
pub fn transition(
  existing: Option<VoteKind>,
  requested: VoteKind,
) -> (VoteAction, i64) {
  match existing {
    None => (VoteAction::Added, requested.weight()),
    Some(held) if held == requested => {
      (VoteAction::Removed, -requested.weight())
    }
    Some(_) => (VoteAction::Changed, 2 * requested.weight()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use VoteKind::{Downvote, Upvote};

  #[test]
  fn fresh_upvote_adds_plus_one() {
    assert_eq!(transition(None, Upvote), (VoteAction::Added, 1));
  }

  #[test]
  fn fresh_downvote_adds_minus_one() {
    assert_eq!(transition(None, Downvote), (VoteAction::Added, -1));
  }

  #[test]
  fn repeated_upvote_toggles_off() {
    assert_eq!(transition(Some(Upvote), Upvote), (VoteAction::Removed, -1));
  }

  #[test]
  fn repeated_downvote_toggles_off() {
    assert_eq!(
      transition(Some(Downvote), Downvote),
      (VoteAction::Removed, 1)
    );
  }

  #[test]
  fn upvote_to_downvote_swings_by_two() {
    assert_eq!(
      transition(Some(Upvote), Downvote),
      (VoteAction::Changed, -2)
    );
  }

  #[test]
  fn downvote_to_upvote_swings_by_two() {
    assert_eq!(transition(Some(Downvote), Upvote), (VoteAction::Changed, 2));
  }

  /// Any sequence of transitions keeps the counter equal to the weight of
  /// the held vote, starting from zero.
  #[test]
  fn counter_tracks_held_vote_over_any_sequence() {
    let casts = [Upvote, Upvote, Downvote, Downvote, Upvote, Downvote];
    let mut held: Option<VoteKind> = None;
    let mut counter = 0i64;

    for requested in casts {
      let (action, delta) = transition(held, requested);
      counter += delta;
      held = match action {
        VoteAction::Removed => None,
        VoteAction::Added | VoteAction::Changed => Some(requested),
      };
      assert_eq!(counter, held.map_or(0, VoteKind::weight));
    }
  }
}
