//! Error type for `stackit-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain failure (target missing, self-vote, taken username, …).
  #[error("core error: {0}")]
  Core(#[from] stackit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Raised inside transaction bodies, where statements run against the
  /// raw connection rather than through `tokio_rusqlite`.
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

/// Collapse onto the domain taxonomy; everything that is not a domain
/// failure surfaces as opaque storage trouble.
impl From<Error> for stackit_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => Self::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
