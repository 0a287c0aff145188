//! Notifications — an owned, independent record per recipient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
  Answer,
  Comment,
  Mention,
  Vote,
}

/// A notification as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
  pub notification_id: Uuid,
  /// Recipient. Read-state toggles and deletion are scoped to this user.
  pub user_id:         Uuid,
  pub kind:            NotificationKind,
  pub message:         String,
  /// The triggering entity; weak reference, may outlive its target.
  pub related_id:      Option<Uuid>,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::ForumStore::add_notification`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub user_id:    Uuid,
  pub kind:       NotificationKind,
  pub message:    String,
  pub related_id: Option<Uuid>,
}
