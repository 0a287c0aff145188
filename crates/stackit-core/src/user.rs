//! Users and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level attached to every account.
///
/// The set is closed; elevation happens only through the admin-only role
/// update operation, never self-service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// May read and authenticate, but not post or vote.
  Guest,
  User,
  Admin,
}

impl Role {
  /// Whether this role may create content and cast votes.
  pub fn can_contribute(self) -> bool {
    matches!(self, Self::User | Self::Admin)
  }
}

/// A registered account.
///
/// Deliberately not `Serialize` — the password hash must never reach a
/// response body. Handlers convert to their own profile representation.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::ForumStore::create_user`].
/// `user_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
}
