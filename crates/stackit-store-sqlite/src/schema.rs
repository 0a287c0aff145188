//! SQL schema for the StackIt SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,    -- argon2 PHC string
    role          TEXT NOT NULL DEFAULT 'user',   -- 'guest' | 'user' | 'admin'
    created_at    TEXT NOT NULL     -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS questions (
    question_id        TEXT PRIMARY KEY,
    user_id            TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title              TEXT NOT NULL,
    body               TEXT NOT NULL,
    accepted_answer_id TEXT REFERENCES answers(answer_id) ON DELETE SET NULL,
    votes              INTEGER NOT NULL DEFAULT 0,  -- signed sum of this question's vote rows
    view_count         INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS answers (
    answer_id   TEXT PRIMARY KEY,
    question_id TEXT NOT NULL REFERENCES questions(question_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    content     TEXT NOT NULL,
    votes       INTEGER NOT NULL DEFAULT 0,  -- signed sum of this answer's vote rows
    is_accepted INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- At most one vote per (user, target). The target reference is weak
-- (id + discriminator), so no FK can cover it; the store's delete
-- operations remove a target's vote rows in the same transaction.
CREATE TABLE IF NOT EXISTS votes (
    vote_id     TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    target_id   TEXT NOT NULL,
    target_kind TEXT NOT NULL CHECK (target_kind IN ('question', 'answer')),
    vote_kind   TEXT NOT NULL CHECK (vote_kind IN ('upvote', 'downvote')),
    created_at  TEXT NOT NULL,
    UNIQUE (user_id, target_id, target_kind)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    kind            TEXT NOT NULL CHECK (kind IN ('answer', 'comment', 'mention', 'vote')),
    message         TEXT NOT NULL,
    related_id      TEXT,            -- weak reference to the triggering entity
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS votes_target_idx       ON votes(target_kind, target_id);
CREATE INDEX IF NOT EXISTS answers_question_idx   ON answers(question_id);
CREATE INDEX IF NOT EXISTS notifications_user_idx ON notifications(user_id, is_read);
CREATE INDEX IF NOT EXISTS questions_created_idx  ON questions(created_at);

PRAGMA user_version = 1;
";
