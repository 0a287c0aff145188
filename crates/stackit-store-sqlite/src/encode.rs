//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum discriminants are
//! stored as the lowercase strings the schema CHECK constraints name. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use stackit_core::{
  answer::Answer,
  notification::{Notification, NotificationKind},
  question::Question,
  user::{Role, User},
  vote::{TargetKind, TargetRef, Vote, VoteKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Guest => "guest",
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "guest" => Ok(Role::Guest),
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(stackit_core::Error::UnknownRole(other.to_owned()).into()),
  }
}

// ─── TargetKind ───────────────────────────────────────────────────────────────

pub fn encode_target_kind(k: TargetKind) -> &'static str {
  match k {
    TargetKind::Question => "question",
    TargetKind::Answer => "answer",
  }
}

pub fn decode_target_kind(s: &str) -> Result<TargetKind> {
  match s {
    "question" => Ok(TargetKind::Question),
    "answer" => Ok(TargetKind::Answer),
    other => {
      Err(stackit_core::Error::UnknownTargetKind(other.to_owned()).into())
    }
  }
}

// ─── VoteKind ─────────────────────────────────────────────────────────────────

pub fn encode_vote_kind(k: VoteKind) -> &'static str {
  match k {
    VoteKind::Upvote => "upvote",
    VoteKind::Downvote => "downvote",
  }
}

pub fn decode_vote_kind(s: &str) -> Result<VoteKind> {
  match s {
    "upvote" => Ok(VoteKind::Upvote),
    "downvote" => Ok(VoteKind::Downvote),
    other => Err(stackit_core::Error::UnknownVoteKind(other.to_owned()).into()),
  }
}

// ─── NotificationKind ─────────────────────────────────────────────────────────

pub fn encode_notification_kind(k: NotificationKind) -> &'static str {
  match k {
    NotificationKind::Answer => "answer",
    NotificationKind::Comment => "comment",
    NotificationKind::Mention => "mention",
    NotificationKind::Vote => "vote",
  }
}

pub fn decode_notification_kind(s: &str) -> Result<NotificationKind> {
  match s {
    "answer" => Ok(NotificationKind::Answer),
    "comment" => Ok(NotificationKind::Comment),
    "mention" => Ok(NotificationKind::Mention),
    "vote" => Ok(NotificationKind::Vote),
    other => {
      Err(stackit_core::Error::UnknownNotificationKind(other.to_owned()).into())
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `questions` row.
pub struct RawQuestion {
  pub question_id:        String,
  pub user_id:            String,
  pub title:              String,
  pub body:               String,
  pub accepted_answer_id: Option<String>,
  pub votes:              i64,
  pub view_count:         i64,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      question_id:        decode_uuid(&self.question_id)?,
      user_id:            decode_uuid(&self.user_id)?,
      title:              self.title,
      body:               self.body,
      accepted_answer_id: self
        .accepted_answer_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      votes:              self.votes,
      view_count:         self.view_count,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `answers` row.
pub struct RawAnswer {
  pub answer_id:   String,
  pub question_id: String,
  pub user_id:     String,
  pub content:     String,
  pub votes:       i64,
  pub is_accepted: bool,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawAnswer {
  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      answer_id:   decode_uuid(&self.answer_id)?,
      question_id: decode_uuid(&self.question_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      content:     self.content,
      votes:       self.votes,
      is_accepted: self.is_accepted,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `votes` row.
pub struct RawVote {
  pub vote_id:     String,
  pub user_id:     String,
  pub target_id:   String,
  pub target_kind: String,
  pub vote_kind:   String,
  pub created_at:  String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      vote_id:    decode_uuid(&self.vote_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      target:     TargetRef {
        kind: decode_target_kind(&self.target_kind)?,
        id:   decode_uuid(&self.target_id)?,
      },
      kind:       decode_vote_kind(&self.vote_kind)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub user_id:         String,
  pub kind:            String,
  pub message:         String,
  pub related_id:      Option<String>,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      kind:            decode_notification_kind(&self.kind)?,
      message:         self.message,
      related_id:      self.related_id.as_deref().map(decode_uuid).transpose()?,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
