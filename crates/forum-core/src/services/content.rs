//! Content store: posts and comments, ownership rules and the revision trail.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{
    Comment, CommentId, ModerationStatus, NewComment, NewPost, Post, PostEdit, PostId,
    PostRevision, Role, UserId, VoteCounts, VoteTarget,
};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository, UserRepository};

use super::moderation::ModerationEngine;
use super::notifications::Notifier;
use super::votes::VoteLedger;

/// A post as rendered for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub likes: u64,
    pub dislikes: u64,
    pub modified: bool,
    pub editable: bool,
}

/// A comment with its vote counts.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub likes: u64,
    pub dislikes: u64,
}

pub struct ContentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    votes: Arc<VoteLedger>,
    moderation: Arc<ModerationEngine>,
    notifier: Arc<Notifier>,
}

impl ContentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        votes: Arc<VoteLedger>,
        moderation: Arc<ModerationEngine>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            votes,
            moderation,
            notifier,
        }
    }

    /// Create a post. Its status comes from the author's role at this moment;
    /// pending posts notify the author and the staff once stored.
    pub async fn create_post(
        &self,
        author: UserId,
        title: &str,
        content: &str,
        image_path: Option<&str>,
    ) -> Result<Post, DomainError> {
        let title = title.trim();
        if title.is_empty() || content.trim().is_empty() {
            return Err(DomainError::validation("Title and content are required"));
        }
        let role = self.actor_role(author).await?;

        let post = self
            .posts
            .insert(NewPost {
                user_id: author,
                title: title.to_string(),
                content: content.to_string(),
                image_path: non_empty(image_path),
                moderation_status: self.moderation.initial_status(role),
            })
            .await?;

        tracing::info!(post_id = post.id, author, status = %post.moderation_status, "Post created");

        let hooks = self.moderation.creation_hooks(&post);
        self.notifier.dispatch(hooks).await;
        Ok(post)
    }

    /// Edit a post. Only its author may, whatever their role.
    pub async fn edit_post(
        &self,
        post_id: PostId,
        actor: UserId,
        edit: PostEdit,
    ) -> Result<Post, DomainError> {
        let post = self.find_post(post_id).await?;
        if post.user_id != actor {
            return Err(DomainError::Forbidden);
        }
        if edit.content.trim().is_empty() {
            return Err(DomainError::validation("Content is required"));
        }

        let title = match edit.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => post.title.clone(),
        };
        let image_path = match non_empty(edit.image_path.as_deref()) {
            Some(path) => Some(path),
            None => post.image_path.clone(),
        };

        let revision = PostRevision {
            title,
            content: edit.content,
            original_content: post.revision_baseline(),
            image_path,
            modified_at: Utc::now(),
        };

        let updated = self.posts.update_revision(post_id, revision).await?;
        tracing::info!(post_id, actor, "Post edited");
        Ok(updated)
    }

    /// Delete a post. Its author may; staff may delete any post.
    pub async fn delete_post(&self, post_id: PostId, actor: UserId) -> Result<(), DomainError> {
        let post = self.find_post(post_id).await?;
        if post.user_id != actor && !self.actor_role(actor).await?.is_staff() {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete(post_id).await?;
        tracing::info!(post_id, actor, "Post deleted");
        Ok(())
    }

    /// A single post, if `viewer` may see it.
    pub async fn get_post(&self, post_id: PostId, viewer: Option<UserId>) -> Result<PostView, DomainError> {
        let post = self.find_post(post_id).await?;
        let viewer = self.viewer(viewer).await?;
        if !post.is_visible_to(viewer) {
            return Err(DomainError::not_found("post", post_id));
        }
        let editable = viewer.is_some_and(|(id, _)| id == post.user_id);
        self.post_view(post, editable).await
    }

    /// Public listing: approved posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, DomainError> {
        self.approved_views(None).await
    }

    pub async fn recent_posts(&self, limit: u64) -> Result<Vec<PostView>, DomainError> {
        self.approved_views(Some(limit)).await
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        author: UserId,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let role = self.actor_role(author).await?;
        let post = self.find_post(post_id).await?;
        if !post.is_visible_to(Some((author, role))) {
            return Err(DomainError::not_found("post", post_id));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("Comment cannot be empty"));
        }

        let comment = self
            .comments
            .insert(NewComment {
                post_id,
                user_id: author,
                content: content.to_string(),
            })
            .await?;
        tracing::debug!(comment_id = comment.id, post_id, author, "Comment added");
        Ok(comment)
    }

    /// Delete one's own comment.
    pub async fn delete_comment(&self, comment_id: CommentId, actor: UserId) -> Result<(), DomainError> {
        let comment = self.find_comment(comment_id).await?;
        if comment.user_id != actor {
            return Err(DomainError::Forbidden);
        }
        self.comments.delete(comment_id).await?;
        tracing::debug!(comment_id, actor, "Comment deleted");
        Ok(())
    }

    /// Delete any comment as staff.
    pub async fn delete_comment_as_moderator(
        &self,
        comment_id: CommentId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if !self.actor_role(actor).await?.is_staff() {
            return Err(DomainError::Forbidden);
        }
        self.find_comment(comment_id).await?;
        self.comments.delete(comment_id).await?;
        tracing::info!(comment_id, actor, "Comment removed by moderator");
        Ok(())
    }

    /// Comments under a visible post, oldest first.
    pub async fn comments_for_post(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> Result<Vec<CommentView>, DomainError> {
        let post = self.find_post(post_id).await?;
        if !post.is_visible_to(self.viewer(viewer).await?) {
            return Err(DomainError::not_found("post", post_id));
        }

        let comments = self.comments.list_by_post(post_id).await?;
        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            let VoteCounts { likes, dislikes } =
                self.votes.counts(VoteTarget::Comment(comment.id)).await?;
            views.push(CommentView {
                comment,
                likes,
                dislikes,
            });
        }
        Ok(views)
    }

    async fn approved_views(&self, limit: Option<u64>) -> Result<Vec<PostView>, DomainError> {
        let posts = self
            .posts
            .list_by_status(ModerationStatus::Approved, limit)
            .await?;
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.post_view(post, false).await?);
        }
        Ok(views)
    }

    async fn post_view(&self, post: Post, editable: bool) -> Result<PostView, DomainError> {
        let VoteCounts { likes, dislikes } = self.votes.counts(VoteTarget::Post(post.id)).await?;
        let modified = post.is_modified();
        Ok(PostView {
            post,
            likes,
            dislikes,
            modified,
            editable,
        })
    }

    async fn find_post(&self, post_id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn find_comment(&self, comment_id: CommentId) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    async fn actor_role(&self, actor: UserId) -> Result<Role, DomainError> {
        match self.users.find_by_id(actor).await? {
            Some(user) => Ok(user.role),
            None => Err(DomainError::Forbidden),
        }
    }

    /// Re-resolve an anonymous-or-known viewer against the identity store.
    async fn viewer(&self, viewer: Option<UserId>) -> Result<Option<(UserId, Role)>, DomainError> {
        match viewer {
            Some(id) => Ok(self.users.find_by_id(id).await?.map(|u| (u.id, u.role))),
            None => Ok(None),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
