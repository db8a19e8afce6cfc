//! Notification fan-out.
//!
//! Notifications are side effects of a committed state change. They are
//! collected into an [`AfterCommit`] list while the primary operation runs and
//! dispatched once its write has returned. A failed dispatch is logged and
//! dropped; it never fails or rolls back the operation that triggered it.

use std::sync::Arc;

use crate::domain::{CommentId, NewNotification, Notification, PostId, Role, UserId};
use crate::error::DomainError;
use crate::ports::{NotificationRepository, UserRepository};

const STAFF_ROLES: [Role; 2] = [Role::Moderator, Role::Admin];

/// One notification write, or a fan-out resolved at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    User(NewNotification),
    /// Every current moderator and admin.
    Staff {
        message: String,
        post_id: Option<PostId>,
        comment_id: Option<CommentId>,
    },
}

/// Side effects to run after the primary write.
#[derive(Debug, Default)]
pub struct AfterCommit {
    dispatches: Vec<Dispatch>,
}

impl AfterCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notification: NewNotification) -> &mut Self {
        self.dispatches.push(Dispatch::User(notification));
        self
    }

    pub fn notify_staff(&mut self, message: impl Into<String>, post_id: Option<PostId>) -> &mut Self {
        self.dispatches.push(Dispatch::Staff {
            message: message.into(),
            post_id,
            comment_id: None,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }

    pub fn dispatches(&self) -> &[Dispatch] {
        &self.dispatches
    }
}

/// Writes and reads notifications.
pub struct Notifier {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
}

impl Notifier {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            notifications,
            users,
        }
    }

    /// Append one notification. Fire-and-forget.
    pub async fn notify(
        &self,
        recipient: UserId,
        message: impl Into<String>,
        post_id: Option<PostId>,
        comment_id: Option<CommentId>,
    ) {
        self.write(NewNotification {
            user_id: recipient,
            message: message.into(),
            post_id,
            comment_id,
        })
        .await;
    }

    /// Run every dispatch in order. Each failure is logged on its own and
    /// the remaining dispatches still run.
    pub async fn dispatch(&self, hooks: AfterCommit) {
        for dispatch in hooks.dispatches {
            match dispatch {
                Dispatch::User(notification) => self.write(notification).await,
                Dispatch::Staff {
                    message,
                    post_id,
                    comment_id,
                } => self.fan_out_to_staff(&message, post_id, comment_id).await,
            }
        }
    }

    /// A user's notifications, newest first. Only the user may read them.
    pub async fn list_for_user(
        &self,
        actor: UserId,
        user_id: UserId,
    ) -> Result<Vec<Notification>, DomainError> {
        if actor != user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(self.notifications.list_by_user(user_id).await?)
    }

    /// Remove all of a user's notifications. Only the user may clear them.
    pub async fn clear_all(&self, actor: UserId, user_id: UserId) -> Result<u64, DomainError> {
        if actor != user_id {
            return Err(DomainError::Forbidden);
        }
        let removed = self.notifications.delete_by_user(user_id).await?;
        tracing::debug!(user_id, removed, "Notifications cleared");
        Ok(removed)
    }

    async fn fan_out_to_staff(
        &self,
        message: &str,
        post_id: Option<PostId>,
        comment_id: Option<CommentId>,
    ) {
        // Membership is read per event so role changes apply immediately.
        let staff = match self.users.list_by_roles(&STAFF_ROLES).await {
            Ok(staff) => staff,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list moderators for fan-out");
                return;
            }
        };

        for member in staff {
            self.write(NewNotification {
                user_id: member.id,
                message: message.to_string(),
                post_id,
                comment_id,
            })
            .await;
        }
    }

    async fn write(&self, notification: NewNotification) {
        let recipient = notification.user_id;
        if let Err(e) = self.notifications.insert(notification).await {
            tracing::warn!(recipient, error = %e, "Notification dropped");
        }
    }
}
