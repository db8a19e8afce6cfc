use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, PostId, UserId};

pub type NotificationId = i64;

/// Notification entity. Append-only; removed only by a bulk clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub message: String,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
}

impl NewNotification {
    pub fn about_post(user_id: UserId, message: impl Into<String>, post_id: PostId) -> Self {
        Self {
            user_id,
            message: message.into(),
            post_id: Some(post_id),
            comment_id: None,
        }
    }
}
