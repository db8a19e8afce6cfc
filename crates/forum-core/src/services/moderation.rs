//! Moderation engine: the pending → approved | rejected state machine.
//!
//! | From    | Trigger  | Guard               | To       | Notifies                  |
//! |---------|----------|---------------------|----------|---------------------------|
//! | -       | create   | author is staff     | approved | nobody                    |
//! | -       | create   | author is a user    | pending  | author, every staff member|
//! | pending | approve  | actor is staff      | approved | author                    |
//! | pending | reject   | actor is staff      | rejected | author                    |

use std::sync::Arc;

use crate::domain::{ModerationStatus, NewNotification, Post, PostId, Role, UserId};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

use super::notifications::{AfterCommit, Notifier};

pub struct ModerationEngine {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<Notifier>,
}

impl ModerationEngine {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            posts,
            users,
            notifier,
        }
    }

    /// Status for a post written by an author with `role`.
    pub fn initial_status(&self, role: Role) -> ModerationStatus {
        ModerationStatus::initial_for(role)
    }

    /// Side effects of a freshly created post.
    pub fn creation_hooks(&self, post: &Post) -> AfterCommit {
        let mut hooks = AfterCommit::new();
        if post.moderation_status == ModerationStatus::Pending {
            hooks
                .notify(NewNotification::about_post(
                    post.user_id,
                    format!("Your post \"{}\" has been submitted for review.", post.title),
                    post.id,
                ))
                .notify_staff(
                    format!("New post \"{}\" is pending review.", post.title),
                    Some(post.id),
                );
        }
        hooks
    }

    /// The moderation dashboard: every pending post, newest first.
    pub async fn pending_posts(&self, actor: UserId) -> Result<Vec<Post>, DomainError> {
        self.require_staff(actor).await?;
        Ok(self
            .posts
            .list_by_status(ModerationStatus::Pending, None)
            .await?)
    }

    pub async fn approve(&self, actor: UserId, post_id: PostId) -> Result<Post, DomainError> {
        self.transition(actor, post_id, ModerationStatus::Approved)
            .await
    }

    pub async fn reject(&self, actor: UserId, post_id: PostId) -> Result<Post, DomainError> {
        self.transition(actor, post_id, ModerationStatus::Rejected)
            .await
    }

    /// Flag a post to the staff and acknowledge the reporter.
    pub async fn report_post(&self, reporter: UserId, post_id: PostId) -> Result<(), DomainError> {
        let Some(user) = self.users.find_by_id(reporter).await? else {
            return Err(DomainError::Forbidden);
        };
        let post = match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_visible_to(Some((user.id, user.role))) => post,
            _ => return Err(DomainError::not_found("post", post_id)),
        };

        tracing::info!(post_id, reporter, "Post reported");

        let mut hooks = AfterCommit::new();
        hooks
            .notify_staff(
                format!(
                    "Post \"{}\" (ID:{}) was reported by {} (ID:{})",
                    post.title, post.id, user.username, user.id
                ),
                Some(post.id),
            )
            .notify(NewNotification::about_post(
                user.id,
                "Your report has been sent to the moderators.",
                post.id,
            ));
        self.notifier.dispatch(hooks).await;
        Ok(())
    }

    async fn transition(
        &self,
        actor: UserId,
        post_id: PostId,
        to: ModerationStatus,
    ) -> Result<Post, DomainError> {
        self.require_staff(actor).await?;

        let current = self.find_post(post_id).await?;
        let from = current.moderation_status;
        if !from.can_transition_to(to) {
            return Err(already(from));
        }

        // Lost a race with another moderator between the read and the write
        if !self.posts.transition_status(post_id, from, to).await? {
            let now = self.find_post(post_id).await?;
            return Err(already(now.moderation_status));
        }

        let post = Post {
            moderation_status: to,
            ..current
        };

        tracing::info!(post_id, actor, status = %to, "Post moderated");

        let verb = match to {
            ModerationStatus::Approved => "approved",
            _ => "rejected",
        };
        let mut hooks = AfterCommit::new();
        hooks.notify(NewNotification::about_post(
            post.user_id,
            format!("Your post \"{}\" has been {verb}.", post.title),
            post.id,
        ));
        self.notifier.dispatch(hooks).await;

        Ok(post)
    }

    async fn find_post(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn require_staff(&self, actor: UserId) -> Result<(), DomainError> {
        match self.users.find_by_id(actor).await? {
            Some(user) if user.role.is_staff() => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }
}

fn already(status: ModerationStatus) -> DomainError {
    DomainError::Conflict(format!("Post is already {status}"))
}
