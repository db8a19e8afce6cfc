use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Comment, CommentId, ModerationStatus, NewComment, NewNotification, NewPost, NewUser,
    Notification, Post, PostId, PostRevision, Role, Session, User, UserId, Vote, VoteId,
    VoteTarget, VoteValue,
};
use crate::error::RepoError;

/// Generic repository trait for lookups and deletes by primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` when
    /// nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Accounts are never deleted. Username and email are
/// unique; violations surface as `RepoError::Constraint`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError>;

    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn update_role(&self, id: UserId, role: Role) -> Result<(), RepoError>;

    async fn update_profile(&self, id: UserId, username: &str, photo: &str)
    -> Result<(), RepoError>;

    async fn list_all(&self) -> Result<Vec<User>, RepoError>;

    /// Current holders of any of `roles`, read at call time.
    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, RepoError>;
}

/// Session table, keyed by token.
#[async_trait]
pub trait SessionRepository: BaseRepository<Session, String> {
    async fn insert(&self, session: Session) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite the editable columns of a post.
    async fn update_revision(&self, id: PostId, revision: PostRevision)
    -> Result<Post, RepoError>;

    /// Atomically move a post from `from` to `to`. Returns `false` when the
    /// post is missing or not in `from`.
    async fn transition_status(
        &self,
        id: PostId,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, RepoError>;

    /// Posts with `status`, newest first.
    async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, CommentId> {
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post, oldest first.
    async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError>;

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, RepoError>;
}

/// Vote ledger storage. At most one row per (voter, target).
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find(&self, user_id: UserId, target: VoteTarget) -> Result<Option<Vote>, RepoError>;

    /// Insert a vote; a duplicate (voter, target) is a `RepoError::Constraint`.
    async fn insert(
        &self,
        user_id: UserId,
        target: VoteTarget,
        value: VoteValue,
    ) -> Result<Vote, RepoError>;

    async fn update_value(&self, id: VoteId, value: VoteValue) -> Result<(), RepoError>;

    /// Rows on `target` carrying `value`.
    async fn count(&self, target: VoteTarget, value: VoteValue) -> Result<u64, RepoError>;

    /// Post votes cast by `user_id` carrying `value`.
    async fn count_post_votes_by_user(
        &self,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<u64, RepoError>;
}

/// Notification repository.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, RepoError>;

    /// A user's notifications, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepoError>;

    /// Delete every notification of a user, returning how many went.
    async fn delete_by_user(&self, user_id: UserId) -> Result<u64, RepoError>;
}

/// Store handles injected into the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}
