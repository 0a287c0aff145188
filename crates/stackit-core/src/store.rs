//! The `ForumStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `stackit-store-sqlite`).
//! Higher layers (`stackit-api`, `stackit-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  answer::{Answer, NewAnswer},
  notification::{NewNotification, Notification, NotificationKind},
  question::{NewQuestion, Question},
  user::{NewUser, Role, User},
  vote::{TargetRef, Vote, VoteKind, VoteReceipt, VoteStats},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Limit/offset window for list operations.
#[derive(Debug, Clone, Copy)]
pub struct Page {
  pub limit:  usize,
  pub offset: usize,
}

impl Default for Page {
  fn default() -> Self {
    Self { limit: 20, offset: 0 }
  }
}

/// Filters for [`ForumStore::notifications_for`].
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
  pub unread_only: bool,
  pub kind:        Option<NotificationKind>,
  pub page:        Page,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a StackIt storage backend.
///
/// Operations that touch more than one row (`cast_vote`, `accept_answer`,
/// `delete_question`) execute as a single atomic unit: all writes commit
/// together or none do.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The associated
/// error converts into [`crate::Error`] so callers can map any backend's
/// failures onto the domain taxonomy.
pub trait ForumStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new account. The password hash is produced by
  /// the caller; the store never sees a plaintext password.
  ///
  /// Fails with a username-taken error if the name is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by username — the credential-resolution path.
  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Replace a user's role. Only ever invoked from the admin-only role
  /// update operation.
  fn set_user_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Questions ─────────────────────────────────────────────────────────

  fn add_question(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// Retrieve a question by id. Returns `None` if not found.
  fn get_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// Retrieve a question and bump its view counter in the same atomic
  /// unit. The returned row reflects the incremented count.
  fn view_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// List questions, newest first.
  fn list_questions(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// Rewrite a question's title and body. Ownership is checked by the
  /// caller before this is invoked.
  fn update_question(
    &self,
    id: Uuid,
    title: String,
    body: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a question. Its answers cascade, and the vote rows held
  /// against the question and those answers are removed in the same
  /// atomic unit (the polymorphic vote reference carries no FK).
  fn delete_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark `answer_id` as the accepted answer of `question_id`, clearing
  /// any previously accepted answer. Fails if the answer does not belong
  /// to the question.
  fn accept_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Answers ───────────────────────────────────────────────────────────

  /// Persist an answer. Fails if the question does not exist.
  fn add_answer(
    &self,
    input: NewAnswer,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  /// Retrieve an answer by id. Returns `None` if not found.
  fn get_answer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Answer>, Self::Error>> + Send + '_;

  /// All answers for a question — accepted first, then by votes.
  fn answers_for(
    &self,
    question_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  fn update_answer(
    &self,
    id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete an answer, its vote rows, and any `accepted_answer_id`
  /// pointing at it, in one atomic unit.
  fn delete_answer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Cast a vote: classify the transition against any existing vote row,
  /// apply exactly one row mutation, and adjust the target's denormalized
  /// counter by the transition delta — all in one atomic unit.
  ///
  /// Fails before touching the ledger if the target is missing or owned
  /// by the voter. Notification emission is the caller's concern and is
  /// never part of this operation.
  fn cast_vote(
    &self,
    voter_id: Uuid,
    target: TargetRef,
    kind: VoteKind,
  ) -> impl Future<Output = Result<VoteReceipt, Self::Error>> + Send + '_;

  /// The caller's current votes on the given targets. Targets without a
  /// vote row are simply absent from the result.
  fn votes_for<'a>(
    &'a self,
    user_id: Uuid,
    targets: &'a [TargetRef],
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + 'a;

  /// Aggregate voting totals for one user.
  fn vote_stats(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<VoteStats, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn add_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// A recipient's notifications, newest first, filtered by `query`.
  fn notifications_for(
    &self,
    user_id: Uuid,
    query: NotificationQuery,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn unread_count(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Mark one notification read. Returns `false` when the id does not
  /// exist or belongs to another user.
  fn mark_read(
    &self,
    user_id: Uuid,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Mark all of a recipient's unread notifications read; returns how
  /// many rows changed.
  fn mark_all_read(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete one notification. Returns `false` when the id does not exist
  /// or belongs to another user.
  fn delete_notification(
    &self,
    user_id: Uuid,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete all of a recipient's notifications; returns how many rows
  /// were removed.
  fn delete_all_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
