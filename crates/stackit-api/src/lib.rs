//! JSON REST API for StackIt.
//!
//! Exposes an axum [`Router`] backed by any [`stackit_core::store::ForumStore`].
//! TLS and transport concerns are the caller's responsibility; authentication
//! is HTTP Basic against the user store (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stackit_api::api_router(state.clone()))
//! ```

pub mod answers;
pub mod auth;
pub mod error;
pub mod notifications;
pub mod questions;
pub mod users;
pub mod votes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use stackit_core::{notify::Notifier, store::ForumStore};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: ForumStore> {
  pub store:    Arc<S>,
  /// Consumes post-commit events; failures never reach a response.
  pub notifier: Arc<Notifier<S>>,
}

impl<S: ForumStore> AppState<S> {
  pub fn new(store: Arc<S>) -> Self {
    let notifier = Arc::new(Notifier::new(Arc::clone(&store)));
    Self { store, notifier }
  }
}

impl<S: ForumStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ForumStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/me", get(users::me::<S>))
    .route("/users/{id}/role", put(users::set_role::<S>))
    // Questions
    .route(
      "/questions",
      get(questions::list::<S>).post(questions::create::<S>),
    )
    .route(
      "/questions/{id}",
      get(questions::get_one::<S>)
        .put(questions::update::<S>)
        .delete(questions::delete::<S>),
    )
    .route(
      "/questions/{id}/answers",
      get(answers::list::<S>).post(answers::create::<S>),
    )
    .route("/questions/{id}/accept/{answer_id}", post(questions::accept::<S>))
    // Answers
    .route(
      "/answers/{id}",
      put(answers::update::<S>).delete(answers::delete::<S>),
    )
    // Votes
    .route("/votes", post(votes::cast::<S>))
    .route("/votes/bulk", post(votes::bulk::<S>))
    .route("/votes/stats", get(votes::stats::<S>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).delete(notifications::delete_all::<S>),
    )
    .route(
      "/notifications/unread-count",
      get(notifications::unread_count::<S>),
    )
    .route("/notifications/read-all", post(notifications::read_all::<S>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
    .route("/notifications/{id}", delete(notifications::delete_one::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use stackit_core::user::{NewUser, Role};
  use stackit_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn state() -> AppState<SqliteStore> {
    AppState::new(Arc::new(SqliteStore::open_in_memory().await.unwrap()))
  }

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  async fn seed_user(
    state: &AppState<SqliteStore>,
    name: &str,
    password: &str,
    role: Role,
  ) -> Uuid {
    state
      .store
      .create_user(NewUser {
        username:      name.to_owned(),
        password_hash: hash(password),
        role,
      })
      .await
      .unwrap()
      .user_id
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn ask_question(
    state: &AppState<SqliteStore>,
    auth: &str,
    title: &str,
  ) -> Uuid {
    let resp = send(
      state.clone(),
      "POST",
      "/questions",
      Some(auth),
      Some(json!({ "title": title, "body": "details" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    body["question_id"].as_str().unwrap().parse().unwrap()
  }

  // ── Registration and identity ───────────────────────────────────────────────

  #[tokio::test]
  async fn register_then_fetch_profile() {
    let state = state().await;

    let resp = send(
      state.clone(),
      "POST",
      "/users",
      None,
      Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["role"], "user");
    assert!(created.get("password_hash").is_none());

    let auth = basic("alice", "secret1");
    let me = send(state, "GET", "/users/me", Some(&auth), None).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(json_body(me).await["username"], "alice");
  }

  #[tokio::test]
  async fn register_rejects_duplicates_and_weak_passwords() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;

    let dup = send(
      state.clone(),
      "POST",
      "/users",
      None,
      Some(json!({ "username": "alice", "password": "secret2" })),
    )
    .await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let weak = send(
      state,
      "POST",
      "/users",
      None,
      Some(json!({ "username": "bob", "password": "short" })),
    )
    .await;
    assert_eq!(weak.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn mutating_endpoints_require_authentication() {
    let state = state().await;

    let resp = send(
      state.clone(),
      "POST",
      "/questions",
      None,
      Some(json!({ "title": "t", "body": "b" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let vote = send(
      state,
      "POST",
      "/votes",
      None,
      Some(json!({
        "target_kind": "question",
        "target_id": Uuid::new_v4(),
        "vote_kind": "upvote",
      })),
    )
    .await;
    assert_eq!(vote.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn guests_are_read_only() {
    let state = state().await;
    seed_user(&state, "lurker", "secret1", Role::Guest).await;
    let auth = basic("lurker", "secret1");

    let ask = send(
      state.clone(),
      "POST",
      "/questions",
      Some(&auth),
      Some(json!({ "title": "t", "body": "b" })),
    )
    .await;
    assert_eq!(ask.status(), StatusCode::FORBIDDEN);

    let list = send(state, "GET", "/questions", Some(&auth), None).await;
    assert_eq!(list.status(), StatusCode::OK);
  }

  // ── Questions ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ask_view_and_list_questions() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    let auth = basic("alice", "secret1");

    let q = ask_question(&state, &auth, "How do I shot web?").await;

    let detail =
      send(state.clone(), "GET", &format!("/questions/{q}"), None, None).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let body = json_body(detail).await;
    assert_eq!(body["view_count"], 1);
    assert_eq!(body["votes"], 0);
    assert!(body["caller_vote"].is_null());

    let list = send(state, "GET", "/questions", None, None).await;
    let listed = json_body(list).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn only_owner_or_admin_may_edit_a_question() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    seed_user(&state, "root", "secret3", Role::Admin).await;
    let alice = basic("alice", "secret1");

    let q = ask_question(&state, &alice, "Original").await;
    let update = json!({ "title": "Edited", "body": "b" });

    let other = send(
      state.clone(),
      "PUT",
      &format!("/questions/{q}"),
      Some(&basic("bob", "secret2")),
      Some(update.clone()),
    )
    .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let owner = send(
      state.clone(),
      "PUT",
      &format!("/questions/{q}"),
      Some(&alice),
      Some(update.clone()),
    )
    .await;
    assert_eq!(owner.status(), StatusCode::NO_CONTENT);

    let admin = send(
      state,
      "DELETE",
      &format!("/questions/{q}"),
      Some(&basic("root", "secret3")),
      None,
    )
    .await;
    assert_eq!(admin.status(), StatusCode::NO_CONTENT);
  }

  // ── Vote ledger over HTTP ───────────────────────────────────────────────────

  fn vote_body(q: Uuid, kind: &str) -> Value {
    json!({ "target_kind": "question", "target_id": q, "vote_kind": kind })
  }

  #[tokio::test]
  async fn upvote_notifies_the_owner_exactly_once() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");

    let q = ask_question(&state, &alice, "Votable").await;

    let resp = send(
      state.clone(),
      "POST",
      "/votes",
      Some(&bob),
      Some(vote_body(q, "upvote")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["action"], "added");
    assert_eq!(body["vote_change"], 1);

    let unread = send(
      state.clone(),
      "GET",
      "/notifications/unread-count",
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(json_body(unread).await["unread"], 1);

    let list =
      send(state, "GET", "/notifications", Some(&alice), None).await;
    let notifications = json_body(list).await;
    let first = &notifications.as_array().unwrap()[0];
    assert_eq!(first["kind"], "vote");
    assert_eq!(first["message"], "bob upvoted your question");
  }

  #[tokio::test]
  async fn toggle_and_switch_follow_the_transition_table() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");
    let q = ask_question(&state, &alice, "Votable").await;

    // up → up toggles off → down adds → up switches.
    let expectations = [
      ("upvote", "added", 1),
      ("upvote", "removed", -1),
      ("downvote", "added", -1),
      ("upvote", "changed", 2),
    ];
    for (kind, action, change) in expectations {
      let resp = send(
        state.clone(),
        "POST",
        "/votes",
        Some(&bob),
        Some(vote_body(q, kind)),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::OK);
      let body = json_body(resp).await;
      assert_eq!(body["action"], action, "casting {kind}");
      assert_eq!(body["vote_change"], change, "casting {kind}");
    }

    // Net counter: +1 −1 −1 +2 = 1.
    let detail =
      send(state.clone(), "GET", &format!("/questions/{q}"), None, None).await;
    assert_eq!(json_body(detail).await["votes"], 1);

    // Only the two upvote-final casts notified.
    let unread = send(
      state,
      "GET",
      "/notifications/unread-count",
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(json_body(unread).await["unread"], 2);
  }

  #[tokio::test]
  async fn self_votes_and_downvotes_do_not_notify() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");
    let q = ask_question(&state, &alice, "Votable").await;

    let own = send(
      state.clone(),
      "POST",
      "/votes",
      Some(&alice),
      Some(vote_body(q, "upvote")),
    )
    .await;
    assert_eq!(own.status(), StatusCode::FORBIDDEN);

    let down = send(
      state.clone(),
      "POST",
      "/votes",
      Some(&bob),
      Some(vote_body(q, "downvote")),
    )
    .await;
    assert_eq!(down.status(), StatusCode::OK);

    // Rejected self-vote left the counter alone; the downvote moved it.
    let detail =
      send(state.clone(), "GET", &format!("/questions/{q}"), None, None).await;
    assert_eq!(json_body(detail).await["votes"], -1);

    let unread = send(
      state,
      "GET",
      "/notifications/unread-count",
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(json_body(unread).await["unread"], 0);
  }

  #[tokio::test]
  async fn vote_validation_and_missing_targets() {
    let state = state().await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let bob = basic("bob", "secret2");

    let bad_kind = send(
      state.clone(),
      "POST",
      "/votes",
      Some(&bob),
      Some(json!({
        "target_kind": "question",
        "target_id": Uuid::new_v4(),
        "vote_kind": "sideways",
      })),
    )
    .await;
    // Rejected at deserialization, before the ledger is touched.
    assert!(bad_kind.status().is_client_error());

    let missing = send(
      state,
      "POST",
      "/votes",
      Some(&bob),
      Some(vote_body(Uuid::new_v4(), "upvote")),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bulk_vote_lookup_returns_only_held_votes() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");

    let voted = ask_question(&state, &alice, "Voted").await;
    let skipped = ask_question(&state, &alice, "Skipped").await;
    send(
      state.clone(),
      "POST",
      "/votes",
      Some(&bob),
      Some(vote_body(voted, "upvote")),
    )
    .await;

    let resp = send(
      state,
      "POST",
      "/votes/bulk",
      Some(&bob),
      Some(json!({ "targets": [
        { "kind": "question", "id": voted },
        { "kind": "question", "id": skipped },
      ]})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let votes = json_body(resp).await;
    let votes = votes.as_array().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["target"]["id"], voted.to_string());
    assert_eq!(votes[0]["kind"], "upvote");
  }

  // ── Answers ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn answering_notifies_the_question_author() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");
    let q = ask_question(&state, &alice, "Answerable").await;

    let resp = send(
      state.clone(),
      "POST",
      &format!("/questions/{q}/answers"),
      Some(&bob),
      Some(json!({ "content": "Like this." })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Self-answer stays silent.
    let own = send(
      state.clone(),
      "POST",
      &format!("/questions/{q}/answers"),
      Some(&alice),
      Some(json!({ "content": "Never mind, solved it." })),
    )
    .await;
    assert_eq!(own.status(), StatusCode::CREATED);

    let list =
      send(state, "GET", "/notifications", Some(&alice), None).await;
    let notifications = json_body(list).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "answer");
    assert_eq!(notifications[0]["message"], "bob answered your question");
  }

  #[tokio::test]
  async fn only_the_author_accepts_answers() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");
    let q = ask_question(&state, &alice, "Acceptable").await;

    let resp = send(
      state.clone(),
      "POST",
      &format!("/questions/{q}/answers"),
      Some(&bob),
      Some(json!({ "content": "Like this." })),
    )
    .await;
    let answer_id = json_body(resp).await["answer_id"]
      .as_str()
      .unwrap()
      .to_owned();

    let not_author = send(
      state.clone(),
      "POST",
      &format!("/questions/{q}/accept/{answer_id}"),
      Some(&bob),
      None,
    )
    .await;
    assert_eq!(not_author.status(), StatusCode::FORBIDDEN);

    let author = send(
      state.clone(),
      "POST",
      &format!("/questions/{q}/accept/{answer_id}"),
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(author.status(), StatusCode::NO_CONTENT);

    let answers = send(
      state,
      "GET",
      &format!("/questions/{q}/answers"),
      None,
      None,
    )
    .await;
    let listed = json_body(answers).await;
    assert_eq!(listed.as_array().unwrap()[0]["is_accepted"], true);
  }

  // ── Role administration ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn role_elevation_is_admin_only() {
    let state = state().await;
    let bob_id = seed_user(&state, "bob", "secret2", Role::User).await;
    seed_user(&state, "root", "secret3", Role::Admin).await;

    let self_service = send(
      state.clone(),
      "PUT",
      &format!("/users/{bob_id}/role"),
      Some(&basic("bob", "secret2")),
      Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(self_service.status(), StatusCode::FORBIDDEN);

    let by_admin = send(
      state.clone(),
      "PUT",
      &format!("/users/{bob_id}/role"),
      Some(&basic("root", "secret3")),
      Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(by_admin.status(), StatusCode::NO_CONTENT);

    let me = send(
      state,
      "GET",
      "/users/me",
      Some(&basic("bob", "secret2")),
      None,
    )
    .await;
    assert_eq!(json_body(me).await["role"], "admin");
  }

  // ── Notifications over HTTP ─────────────────────────────────────────────────

  #[tokio::test]
  async fn notification_read_and_delete_flow() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");

    for title in ["One", "Two"] {
      let q = ask_question(&state, &alice, title).await;
      send(
        state.clone(),
        "POST",
        "/votes",
        Some(&bob),
        Some(vote_body(q, "upvote")),
      )
      .await;
    }

    let list = send(
      state.clone(),
      "GET",
      "/notifications?unread_only=true",
      Some(&alice),
      None,
    )
    .await;
    let notifications = json_body(list).await;
    let id = notifications.as_array().unwrap()[0]["notification_id"]
      .as_str()
      .unwrap()
      .to_owned();

    // Bob cannot touch Alice's notification.
    let foreign = send(
      state.clone(),
      "POST",
      &format!("/notifications/{id}/read"),
      Some(&bob),
      None,
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let read = send(
      state.clone(),
      "POST",
      &format!("/notifications/{id}/read"),
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(read.status(), StatusCode::NO_CONTENT);

    let unread = send(
      state.clone(),
      "GET",
      "/notifications/unread-count",
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(json_body(unread).await["unread"], 1);

    let cleared = send(
      state.clone(),
      "DELETE",
      "/notifications",
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(json_body(cleared).await["deleted"], 2);

    let empty =
      send(state, "GET", "/notifications", Some(&alice), None).await;
    assert!(json_body(empty).await.as_array().unwrap().is_empty());
  }

  // ── Cascade over HTTP ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn deleting_a_question_takes_votes_with_it() {
    let state = state().await;
    seed_user(&state, "alice", "secret1", Role::User).await;
    seed_user(&state, "bob", "secret2", Role::User).await;
    let alice = basic("alice", "secret1");
    let bob = basic("bob", "secret2");
    let q = ask_question(&state, &alice, "Doomed").await;

    send(
      state.clone(),
      "POST",
      "/votes",
      Some(&bob),
      Some(vote_body(q, "upvote")),
    )
    .await;

    let del = send(
      state.clone(),
      "DELETE",
      &format!("/questions/{q}"),
      Some(&alice),
      None,
    )
    .await;
    assert_eq!(del.status(), StatusCode::NO_CONTENT);

    let gone =
      send(state.clone(), "GET", &format!("/questions/{q}"), None, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let stats = send(state, "GET", "/votes/stats", Some(&bob), None).await;
    assert_eq!(json_body(stats).await["total"], 0);
  }
}
