//! [`SqliteStore`] — the SQLite implementation of [`ForumStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stackit_core::{
  Error as CoreError,
  answer::{Answer, NewAnswer},
  notification::{NewNotification, Notification},
  question::{NewQuestion, Question},
  store::{ForumStore, NotificationQuery, Page},
  user::{NewUser, Role, User},
  vote::{
    TargetKind, TargetRef, Vote, VoteAction, VoteKind, VoteReceipt, VoteStats,
    transition,
  },
};

use crate::{
  Error, Result,
  encode::{
    RawAnswer, RawNotification, RawQuestion, RawUser, RawVote, decode_uuid,
    decode_vote_kind, encode_dt, encode_notification_kind, encode_role,
    encode_target_kind, encode_uuid, encode_vote_kind,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A StackIt forum store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

const USER_COLS: &str = "user_id, username, password_hash, role, created_at";

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:       row.get(0)?,
    username:      row.get(1)?,
    password_hash: row.get(2)?,
    role:          row.get(3)?,
    created_at:    row.get(4)?,
  })
}

const QUESTION_COLS: &str = "question_id, user_id, title, body, \
   accepted_answer_id, votes, view_count, created_at, updated_at";

fn question_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawQuestion> {
  Ok(RawQuestion {
    question_id:        row.get(0)?,
    user_id:            row.get(1)?,
    title:              row.get(2)?,
    body:               row.get(3)?,
    accepted_answer_id: row.get(4)?,
    votes:              row.get(5)?,
    view_count:         row.get(6)?,
    created_at:         row.get(7)?,
    updated_at:         row.get(8)?,
  })
}

const ANSWER_COLS: &str = "answer_id, question_id, user_id, content, votes, \
   is_accepted, created_at, updated_at";

fn answer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAnswer> {
  Ok(RawAnswer {
    answer_id:   row.get(0)?,
    question_id: row.get(1)?,
    user_id:     row.get(2)?,
    content:     row.get(3)?,
    votes:       row.get(4)?,
    is_accepted: row.get(5)?,
    created_at:  row.get(6)?,
    updated_at:  row.get(7)?,
  })
}

fn vote_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVote> {
  Ok(RawVote {
    vote_id:     row.get(0)?,
    user_id:     row.get(1)?,
    target_id:   row.get(2)?,
    target_kind: row.get(3)?,
    vote_kind:   row.get(4)?,
    created_at:  row.get(5)?,
  })
}

fn notification_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawNotification> {
  Ok(RawNotification {
    notification_id: row.get(0)?,
    user_id:         row.get(1)?,
    kind:            row.get(2)?,
    message:         row.get(3)?,
    related_id:      row.get(4)?,
    is_read:         row.get(5)?,
    created_at:      row.get(6)?,
  })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Transaction helpers ─────────────────────────────────────────────────────
//
// The ledger primitives (target lookup, existing-vote lookup, counter
// adjustment) live here as functions on the transaction handle, so every
// composition of them is atomic by construction.

/// Owner of a target row, or `None` if the target is gone.
fn target_owner(
  tx: &rusqlite::Transaction<'_>,
  target: TargetRef,
) -> rusqlite::Result<Option<String>> {
  let sql = match target.kind {
    TargetKind::Question => {
      "SELECT user_id FROM questions WHERE question_id = ?1"
    }
    TargetKind::Answer => "SELECT user_id FROM answers WHERE answer_id = ?1",
  };
  tx.query_row(sql, rusqlite::params![encode_uuid(target.id)], |r| r.get(0))
    .optional()
}

/// The voter's current vote on `target`, if any.
fn existing_vote(
  tx: &rusqlite::Transaction<'_>,
  voter: &str,
  target: TargetRef,
) -> Result<Option<VoteKind>> {
  let raw: Option<String> = tx
    .query_row(
      "SELECT vote_kind FROM votes
       WHERE user_id = ?1 AND target_id = ?2 AND target_kind = ?3",
      rusqlite::params![
        voter,
        encode_uuid(target.id),
        encode_target_kind(target.kind)
      ],
      |r| r.get(0),
    )
    .optional()?;
  raw.as_deref().map(decode_vote_kind).transpose()
}

/// Apply a relative delta to the target's denormalized counter. The update
/// is expressed as `votes = votes + ?` so concurrent casts commute instead
/// of losing increments to read-modify-write races.
fn adjust_counter(
  tx: &rusqlite::Transaction<'_>,
  target: TargetRef,
  delta: i64,
) -> rusqlite::Result<()> {
  let sql = match target.kind {
    TargetKind::Question => {
      "UPDATE questions SET votes = votes + ?1 WHERE question_id = ?2"
    }
    TargetKind::Answer => {
      "UPDATE answers SET votes = votes + ?1 WHERE answer_id = ?2"
    }
  };
  tx.execute(sql, rusqlite::params![delta, encode_uuid(target.id)])?;
  Ok(())
}

/// The whole vote cast as one atomic unit: target lookup, self-vote check,
/// transition classification, exactly one vote-row mutation, and the
/// counter adjustment. Either everything commits or nothing does.
fn cast_vote_tx(
  conn: &mut rusqlite::Connection,
  voter_id: Uuid,
  target: TargetRef,
  kind: VoteKind,
) -> Result<VoteReceipt> {
  let tx = conn.transaction()?;

  let owner_str = target_owner(&tx, target)?.ok_or(
    CoreError::TargetNotFound { kind: target.kind, id: target.id },
  )?;
  let owner = decode_uuid(&owner_str)?;

  // Owning the target disqualifies voting; checked before the ledger is
  // touched, so a rejected cast leaves no trace.
  if owner == voter_id {
    return Err(CoreError::SelfVote(target.kind).into());
  }

  let voter_str  = encode_uuid(voter_id);
  let target_str = encode_uuid(target.id);
  let tkind_str  = encode_target_kind(target.kind);

  let existing = existing_vote(&tx, &voter_str, target)?;
  let (action, delta) = transition(existing, kind);

  match action {
    VoteAction::Added => {
      tx.execute(
        "INSERT INTO votes
           (vote_id, user_id, target_id, target_kind, vote_kind, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
          encode_uuid(Uuid::new_v4()),
          voter_str,
          target_str,
          tkind_str,
          encode_vote_kind(kind),
          encode_dt(Utc::now()),
        ],
      )?;
    }
    VoteAction::Removed => {
      tx.execute(
        "DELETE FROM votes
         WHERE user_id = ?1 AND target_id = ?2 AND target_kind = ?3",
        rusqlite::params![voter_str, target_str, tkind_str],
      )?;
    }
    VoteAction::Changed => {
      tx.execute(
        "UPDATE votes SET vote_kind = ?4
         WHERE user_id = ?1 AND target_id = ?2 AND target_kind = ?3",
        rusqlite::params![
          voter_str,
          target_str,
          tkind_str,
          encode_vote_kind(kind)
        ],
      )?;
    }
  }

  adjust_counter(&tx, target, delta)?;
  tx.commit()?;

  Ok(VoteReceipt { action, delta, kind, target_owner: owner })
}

/// Insert an answer after confirming its question still exists.
fn add_answer_tx(
  conn: &mut rusqlite::Connection,
  answer: &Answer,
) -> Result<()> {
  let q_str = encode_uuid(answer.question_id);
  let tx = conn.transaction()?;

  let exists: bool = tx
    .query_row(
      "SELECT 1 FROM questions WHERE question_id = ?1",
      rusqlite::params![q_str],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if !exists {
    return Err(CoreError::QuestionNotFound(answer.question_id).into());
  }

  tx.execute(
    "INSERT INTO answers
       (answer_id, question_id, user_id, content, votes, is_accepted,
        created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(answer.answer_id),
      q_str,
      encode_uuid(answer.user_id),
      answer.content,
      answer.votes,
      answer.is_accepted,
      encode_dt(answer.created_at),
      encode_dt(answer.updated_at),
    ],
  )?;
  tx.commit()?;
  Ok(())
}

/// Flip acceptance to `answer_id`, clearing any previously accepted answer
/// and pointing the question at the new one.
fn accept_answer_tx(
  conn: &mut rusqlite::Connection,
  question_id: Uuid,
  answer_id: Uuid,
) -> Result<()> {
  let q_str = encode_uuid(question_id);
  let a_str = encode_uuid(answer_id);
  let now_str = encode_dt(Utc::now());
  let tx = conn.transaction()?;

  let belongs: bool = tx
    .query_row(
      "SELECT 1 FROM answers WHERE answer_id = ?1 AND question_id = ?2",
      rusqlite::params![a_str, q_str],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if !belongs {
    return Err(CoreError::AnswerNotFound(answer_id).into());
  }

  tx.execute(
    "UPDATE answers SET is_accepted = 0, updated_at = ?2
     WHERE question_id = ?1 AND is_accepted = 1",
    rusqlite::params![q_str, now_str],
  )?;
  tx.execute(
    "UPDATE answers SET is_accepted = 1, updated_at = ?2 WHERE answer_id = ?1",
    rusqlite::params![a_str, now_str],
  )?;
  tx.execute(
    "UPDATE questions SET accepted_answer_id = ?2, updated_at = ?3
     WHERE question_id = ?1",
    rusqlite::params![q_str, a_str, now_str],
  )?;
  tx.commit()?;
  Ok(())
}

/// Delete a question, the vote rows held against it and its answers, and
/// (via FK cascade) the answers themselves.
fn delete_question_tx(conn: &mut rusqlite::Connection, id: Uuid) -> Result<()> {
  let id_str = encode_uuid(id);
  let tx = conn.transaction()?;

  // Vote rows first, while the answer list still exists.
  tx.execute(
    "DELETE FROM votes WHERE target_kind = 'answer' AND target_id IN
       (SELECT answer_id FROM answers WHERE question_id = ?1)",
    rusqlite::params![id_str],
  )?;
  tx.execute(
    "DELETE FROM votes WHERE target_kind = 'question' AND target_id = ?1",
    rusqlite::params![id_str],
  )?;
  let changed = tx.execute(
    "DELETE FROM questions WHERE question_id = ?1",
    rusqlite::params![id_str],
  )?;
  if changed == 0 {
    return Err(CoreError::QuestionNotFound(id).into());
  }
  tx.commit()?;
  Ok(())
}

/// Delete an answer and its vote rows. A stale `accepted_answer_id` on the
/// question is cleared by the FK's `ON DELETE SET NULL`.
fn delete_answer_tx(conn: &mut rusqlite::Connection, id: Uuid) -> Result<()> {
  let id_str = encode_uuid(id);
  let tx = conn.transaction()?;

  tx.execute(
    "DELETE FROM votes WHERE target_kind = 'answer' AND target_id = ?1",
    rusqlite::params![id_str],
  )?;
  let changed = tx.execute(
    "DELETE FROM answers WHERE answer_id = ?1",
    rusqlite::params![id_str],
  )?;
  if changed == 0 {
    return Err(CoreError::AnswerNotFound(id).into());
  }
  tx.commit()?;
  Ok(())
}

// ─── ForumStore impl ─────────────────────────────────────────────────────────

impl ForumStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      role:          input.role,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let at_str   = encode_dt(user.created_at);
    let role_str = encode_role(user.role).to_owned();
    let username = user.username.clone();
    let hash     = user.password_hash.clone();

    self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (user_id, username, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, hash, role_str, at_str],
        );
        Ok(match res {
          Ok(_) => Ok(()),
          Err(e) if is_unique_violation(&e) => {
            Err(Error::Core(CoreError::UsernameTaken(username)))
          }
          Err(e) => Err(Error::Sqlite(e)),
        })
      })
      .await??;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              user_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE username = ?1"),
              rusqlite::params![name],
              user_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn set_user_role(&self, id: Uuid, role: Role) -> Result<()> {
    let id_str   = encode_uuid(id);
    let role_str = encode_role(role).to_owned();

    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET role = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, role_str],
        )?;
        Ok(if changed == 0 {
          Err(Error::Core(CoreError::UserNotFound(id)))
        } else {
          Ok(())
        })
      })
      .await??;
    Ok(())
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn add_question(&self, input: NewQuestion) -> Result<Question> {
    let now = Utc::now();
    let question = Question {
      question_id:        Uuid::new_v4(),
      user_id:            input.user_id,
      title:              input.title,
      body:               input.body,
      accepted_answer_id: None,
      votes:              0,
      view_count:         0,
      created_at:         now,
      updated_at:         now,
    };

    let id_str    = encode_uuid(question.question_id);
    let owner_str = encode_uuid(question.user_id);
    let title     = question.title.clone();
    let body      = question.body.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO questions
             (question_id, user_id, title, body, votes, view_count,
              created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?5)",
          rusqlite::params![id_str, owner_str, title, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(question)
  }

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {QUESTION_COLS} FROM questions WHERE question_id = ?1"
              ),
              rusqlite::params![id_str],
              question_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQuestion::into_question).transpose()
  }

  async fn view_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE questions SET view_count = view_count + 1
           WHERE question_id = ?1",
          rusqlite::params![id_str],
        )?;
        let raw = tx
          .query_row(
            &format!(
              "SELECT {QUESTION_COLS} FROM questions WHERE question_id = ?1"
            ),
            rusqlite::params![id_str],
            question_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawQuestion::into_question).transpose()
  }

  async fn list_questions(&self, page: Page) -> Result<Vec<Question>> {
    let limit  = page.limit as i64;
    let offset = page.offset as i64;

    let raws: Vec<RawQuestion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUESTION_COLS} FROM questions
           ORDER BY created_at DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], question_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn update_question(
    &self,
    id: Uuid,
    title: String,
    body: String,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE questions SET title = ?2, body = ?3, updated_at = ?4
           WHERE question_id = ?1",
          rusqlite::params![id_str, title, body, at_str],
        )?;
        Ok(if changed == 0 {
          Err(Error::Core(CoreError::QuestionNotFound(id)))
        } else {
          Ok(())
        })
      })
      .await??;
    Ok(())
  }

  async fn delete_question(&self, id: Uuid) -> Result<()> {
    self.conn.call(move |conn| Ok(delete_question_tx(conn, id))).await?
  }

  async fn accept_answer(
    &self,
    question_id: Uuid,
    answer_id: Uuid,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(accept_answer_tx(conn, question_id, answer_id)))
      .await?
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn add_answer(&self, input: NewAnswer) -> Result<Answer> {
    let now = Utc::now();
    let answer = Answer {
      answer_id:   Uuid::new_v4(),
      question_id: input.question_id,
      user_id:     input.user_id,
      content:     input.content,
      votes:       0,
      is_accepted: false,
      created_at:  now,
      updated_at:  now,
    };

    let stored = answer.clone();
    self
      .conn
      .call(move |conn| Ok(add_answer_tx(conn, &stored)))
      .await??;

    Ok(answer)
  }

  async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ANSWER_COLS} FROM answers WHERE answer_id = ?1"),
              rusqlite::params![id_str],
              answer_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnswer::into_answer).transpose()
  }

  async fn answers_for(&self, question_id: Uuid) -> Result<Vec<Answer>> {
    let q_str = encode_uuid(question_id);

    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANSWER_COLS} FROM answers
           WHERE question_id = ?1
           ORDER BY is_accepted DESC, votes DESC, created_at ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![q_str], answer_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn update_answer(&self, id: Uuid, content: String) -> Result<()> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE answers SET content = ?2, updated_at = ?3
           WHERE answer_id = ?1",
          rusqlite::params![id_str, content, at_str],
        )?;
        Ok(if changed == 0 {
          Err(Error::Core(CoreError::AnswerNotFound(id)))
        } else {
          Ok(())
        })
      })
      .await??;
    Ok(())
  }

  async fn delete_answer(&self, id: Uuid) -> Result<()> {
    self.conn.call(move |conn| Ok(delete_answer_tx(conn, id))).await?
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(
    &self,
    voter_id: Uuid,
    target: TargetRef,
    kind: VoteKind,
  ) -> Result<VoteReceipt> {
    self
      .conn
      .call(move |conn| Ok(cast_vote_tx(conn, voter_id, target, kind)))
      .await?
  }

  async fn votes_for(
    &self,
    user_id: Uuid,
    targets: &[TargetRef],
  ) -> Result<Vec<Vote>> {
    if targets.is_empty() {
      return Ok(Vec::new());
    }

    let user_str = encode_uuid(user_id);
    let targets  = targets.to_vec();

    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        // One bound placeholder pair per target — values are never
        // interpolated into the statement text.
        let clauses: Vec<String> = (0..targets.len())
          .map(|i| {
            format!(
              "(target_id = ?{} AND target_kind = ?{})",
              2 * i + 2,
              2 * i + 3
            )
          })
          .collect();
        let sql = format!(
          "SELECT vote_id, user_id, target_id, target_kind, vote_kind, created_at
           FROM votes
           WHERE user_id = ?1 AND ({})",
          clauses.join(" OR ")
        );

        let mut params: Vec<String> = Vec::with_capacity(1 + 2 * targets.len());
        params.push(user_str);
        for t in &targets {
          params.push(encode_uuid(t.id));
          params.push(encode_target_kind(t.kind).to_owned());
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), vote_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }

  async fn vote_stats(&self, user_id: Uuid) -> Result<VoteStats> {
    let user_str = encode_uuid(user_id);

    let stats = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(CASE WHEN vote_kind = 'upvote' THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN vote_kind = 'downvote' THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN target_kind = 'question' THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN target_kind = 'answer' THEN 1 ELSE 0 END), 0)
           FROM votes WHERE user_id = ?1",
          rusqlite::params![user_str],
          |row| {
            Ok(VoteStats {
              total:          row.get(0)?,
              upvotes:        row.get(1)?,
              downvotes:      row.get(2)?,
              question_votes: row.get(3)?,
              answer_votes:   row.get(4)?,
            })
          },
        )?)
      })
      .await?;

    Ok(stats)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notification(
    &self,
    input: NewNotification,
  ) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      user_id:         input.user_id,
      kind:            input.kind,
      message:         input.message,
      related_id:      input.related_id,
      is_read:         false,
      created_at:      Utc::now(),
    };

    let id_str      = encode_uuid(notification.notification_id);
    let user_str    = encode_uuid(notification.user_id);
    let kind_str    = encode_notification_kind(notification.kind).to_owned();
    let message     = notification.message.clone();
    let related_str = notification.related_id.map(encode_uuid);
    let at_str      = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications
             (notification_id, user_id, kind, message, related_id, is_read,
              created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
          rusqlite::params![id_str, user_str, kind_str, message, related_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn notifications_for(
    &self,
    user_id: Uuid,
    query: NotificationQuery,
  ) -> Result<Vec<Notification>> {
    let user_str    = encode_uuid(user_id);
    let kind_str    = query.kind.map(encode_notification_kind).map(str::to_owned);
    let unread_only = query.unread_only;
    let limit       = query.page.limit as i64;
    let offset      = query.page.offset as i64;

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        // Fixed placeholder positions; ?2 is referenced only when a kind
        // filter is present, but is always bound.
        let unread_clause = if unread_only { " AND is_read = 0" } else { "" };
        let kind_clause   = if kind_str.is_some() { " AND kind = ?2" } else { "" };

        let sql = format!(
          "SELECT notification_id, user_id, kind, message, related_id,
                  is_read, created_at
           FROM notifications
           WHERE user_id = ?1{unread_clause}{kind_clause}
           ORDER BY created_at DESC
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_str, kind_str.as_deref(), limit, offset],
            notification_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn unread_count(&self, user_id: Uuid) -> Result<u64> {
    let user_str = encode_uuid(user_id);

    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM notifications
           WHERE user_id = ?1 AND is_read = 0",
          rusqlite::params![user_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count)
  }

  async fn mark_read(
    &self,
    user_id: Uuid,
    notification_id: Uuid,
  ) -> Result<bool> {
    let user_str = encode_uuid(user_id);
    let id_str   = encode_uuid(notification_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1
           WHERE notification_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
    let user_str = encode_uuid(user_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1
           WHERE user_id = ?1 AND is_read = 0",
          rusqlite::params![user_str],
        )?)
      })
      .await?;

    Ok(changed as u64)
  }

  async fn delete_notification(
    &self,
    user_id: Uuid,
    notification_id: Uuid,
  ) -> Result<bool> {
    let user_str = encode_uuid(user_id);
    let id_str   = encode_uuid(notification_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications
           WHERE notification_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_all_notifications(&self, user_id: Uuid) -> Result<u64> {
    let user_str = encode_uuid(user_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?)
      })
      .await?;

    Ok(changed as u64)
  }
}
