//! In-memory store - used when no database is configured, and by tests.
//!
//! One lock guards every table so that cascades and uniqueness checks see a
//! consistent snapshot. Data is lost on process restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use forum_core::domain::{
    Comment, CommentId, ModerationStatus, NewComment, NewNotification, NewPost, NewUser,
    Notification, NotificationId, Post, PostId, PostRevision, Role, Session, User, UserId, Vote,
    VoteId, VoteTarget, VoteValue,
};
use forum_core::error::RepoError;
use forum_core::ports::{
    BaseRepository, CommentRepository, NotificationRepository, PostRepository, Repositories,
    SessionRepository, UserRepository, VoteRepository,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    sessions: BTreeMap<String, Session>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    votes: BTreeMap<VoteId, Vote>,
    notifications: BTreeMap<NotificationId, Notification>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn drop_comment(&mut self, comment_id: CommentId) {
        self.comments.remove(&comment_id);
        self.votes
            .retain(|_, v| v.target != VoteTarget::Comment(comment_id));
        for n in self.notifications.values_mut() {
            if n.comment_id == Some(comment_id) {
                n.comment_id = None;
            }
        }
    }

    fn drop_post(&mut self, post_id: PostId) {
        self.posts.remove(&post_id);
        let comment_ids: Vec<CommentId> = self
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        for id in comment_ids {
            self.drop_comment(id);
        }
        self.votes.retain(|_, v| v.target != VoteTarget::Post(post_id));
        for n in self.notifications.values_mut() {
            if n.post_id == Some(post_id) {
                n.post_id = None;
            }
        }
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

/// All forum tables held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store handles for the services, all backed by this store.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            sessions: self.clone(),
            posts: self.clone(),
            comments: self.clone(),
            votes: self.clone(),
            notifications: self.clone(),
        }
    }
}

/// Newest first, ties broken by the larger id.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, None) {
            return Err(RepoError::Constraint("users.username".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users.email".to_string()));
        }

        let id = tables.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            photo: user.photo,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_role(&self, id: UserId, role: Role) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        photo: &str,
    ) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(username, Some(id)) {
            return Err(RepoError::Constraint("users.username".to_string()));
        }
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.username = username.to_string();
        user.photo = photo.to_string();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Session, String> for InMemoryStore {
    async fn find_by_id(&self, token: String) -> Result<Option<Session>, RepoError> {
        Ok(self.tables.read().await.sessions.get(&token).cloned())
    }

    async fn delete(&self, token: String) -> Result<(), RepoError> {
        match self.tables.write().await.sessions.remove(&token) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn insert(&self, session: Session) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(RepoError::Constraint("sessions.user_id".to_string()));
        }
        if tables.sessions.contains_key(&session.token) {
            return Err(RepoError::Constraint("sessions.session_id".to_string()));
        }
        tables.sessions.insert(session.token.clone(), session);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.drop_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.user_id) {
            return Err(RepoError::Constraint("posts.user_id".to_string()));
        }

        let id = tables.next_id();
        let post = Post {
            id,
            user_id: post.user_id,
            title: post.title,
            original_content: Some(post.content.clone()),
            content: post.content,
            image_path: post.image_path,
            moderation_status: post.moderation_status,
            created_at: Utc::now(),
            modified_at: None,
        };
        tables.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_revision(
        &self,
        id: PostId,
        revision: PostRevision,
    ) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = revision.title;
        post.content = revision.content;
        post.original_content = Some(revision.original_content);
        post.image_path = revision.image_path;
        post.modified_at = Some(revision.modified_at);
        Ok(post.clone())
    }

    async fn transition_status(
        &self,
        id: PostId,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&id) {
            Some(post) if post.moderation_status == from => {
                post.moderation_status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.moderation_status == status)
            .cloned()
            .collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        if let Some(limit) = limit {
            posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(posts)
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentId> for InMemoryStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn delete(&self, id: CommentId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.drop_comment(id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comments.post_id".to_string()));
        }
        if !tables.users.contains_key(&comment.user_id) {
            return Err(RepoError::Constraint("comments.user_id".to_string()));
        }

        let id = tables.next_id();
        let comment = Comment {
            id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.user_id == user_id)
            .count() as u64)
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn find(&self, user_id: UserId, target: VoteTarget) -> Result<Option<Vote>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .find(|v| v.user_id == user_id && v.target == target)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: UserId,
        target: VoteTarget,
        value: VoteValue,
    ) -> Result<Vote, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .votes
            .values()
            .any(|v| v.user_id == user_id && v.target == target)
        {
            return Err(RepoError::Constraint("likes.user_target".to_string()));
        }
        let target_exists = match target {
            VoteTarget::Post(id) => tables.posts.contains_key(&id),
            VoteTarget::Comment(id) => tables.comments.contains_key(&id),
        };
        if !target_exists || !tables.users.contains_key(&user_id) {
            return Err(RepoError::Constraint("likes.target".to_string()));
        }

        let id = tables.next_id();
        let vote = Vote {
            id,
            user_id,
            target,
            value,
        };
        tables.votes.insert(id, vote.clone());
        Ok(vote)
    }

    async fn update_value(&self, id: VoteId, value: VoteValue) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let vote = tables.votes.get_mut(&id).ok_or(RepoError::NotFound)?;
        vote.value = value;
        Ok(())
    }

    async fn count(&self, target: VoteTarget, value: VoteValue) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .filter(|v| v.target == target && v.value == value)
            .count() as u64)
    }

    async fn count_post_votes_by_user(
        &self,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .filter(|v| {
                v.user_id == user_id && v.value == value && matches!(v.target, VoteTarget::Post(_))
            })
            .count() as u64)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&notification.user_id) {
            return Err(RepoError::Constraint("notifications.user_id".to_string()));
        }

        let id = tables.next_id();
        let notification = Notification {
            id,
            user_id: notification.user_id,
            message: notification.message,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            created_at: Utc::now(),
        };
        tables.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepoError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut items, |n| (n.created_at, n.id));
        Ok(items)
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|_, n| n.user_id != user_id);
        Ok((before - tables.notifications.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &InMemoryStore, name: &str) -> User {
        UserRepository::insert(
            store,
            NewUser::member(name.to_string(), format!("{name}@example.com"), "hash".into()),
        )
        .await
        .unwrap()
    }

    async fn seed_post(store: &InMemoryStore, author: UserId, status: ModerationStatus) -> Post {
        PostRepository::insert(
            store,
            NewPost {
                user_id: author,
                title: "Title".to_string(),
                content: "Body".to_string(),
                image_path: None,
                moderation_status: status,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_username_and_email_are_unique() {
        let store = InMemoryStore::new();
        seed_user(&store, "alice").await;

        let dup_name = UserRepository::insert(
            &store,
            NewUser::member("alice".into(), "other@example.com".into(), "h".into()),
        )
        .await;
        assert!(matches!(dup_name, Err(RepoError::Constraint(_))));

        let dup_email = UserRepository::insert(
            &store,
            NewUser::member("bob".into(), "alice@example.com".into(), "h".into()),
        )
        .await;
        assert!(matches!(dup_email, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_insert_post_snapshots_original_content() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id, ModerationStatus::Pending).await;

        assert_eq!(post.original_content.as_deref(), Some("Body"));
        assert!(post.modified_at.is_none());
    }

    #[tokio::test]
    async fn test_transition_status_is_compare_and_set() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id, ModerationStatus::Pending).await;

        let first = store
            .transition_status(post.id, ModerationStatus::Pending, ModerationStatus::Approved)
            .await
            .unwrap();
        let second = store
            .transition_status(post.id, ModerationStatus::Pending, ModerationStatus::Rejected)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        let stored = BaseRepository::<Post, PostId>::find_by_id(&store, post.id)
            .await
            .unwrap();
        assert_eq!(stored.unwrap().moderation_status, ModerationStatus::Approved);
    }

    #[tokio::test]
    async fn test_duplicate_vote_is_constraint_violation() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id, ModerationStatus::Approved).await;
        let target = VoteTarget::Post(post.id);

        VoteRepository::insert(&store, alice.id, target, VoteValue::Like)
            .await
            .unwrap();
        let again = VoteRepository::insert(&store, alice.id, target, VoteValue::Dislike).await;

        assert!(matches!(again, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_delete_post_cascades_to_comments_and_votes() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id, ModerationStatus::Approved).await;
        let comment = CommentRepository::insert(
            &store,
            NewComment {
                post_id: post.id,
                user_id: alice.id,
                content: "first".into(),
            },
        )
        .await
        .unwrap();
        VoteRepository::insert(&store, alice.id, VoteTarget::Post(post.id), VoteValue::Like)
            .await
            .unwrap();
        VoteRepository::insert(
            &store,
            alice.id,
            VoteTarget::Comment(comment.id),
            VoteValue::Like,
        )
        .await
        .unwrap();

        BaseRepository::<Post, PostId>::delete(&store, post.id)
            .await
            .unwrap();

        let gone = BaseRepository::<Comment, CommentId>::find_by_id(&store, comment.id)
            .await
            .unwrap();
        assert!(gone.is_none());
        assert_eq!(
            store
                .count(VoteTarget::Comment(comment.id), VoteValue::Like)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            store
                .count_post_votes_by_user(alice.id, VoteValue::Like)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_post_keeps_notification_text() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id, ModerationStatus::Pending).await;
        NotificationRepository::insert(
            &store,
            NewNotification::about_post(alice.id, "submitted", post.id),
        )
        .await
        .unwrap();

        BaseRepository::<Post, PostId>::delete(&store, post.id)
            .await
            .unwrap();

        let items = store.list_by_user(alice.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "submitted");
        assert!(items[0].post_id.is_none());
    }

    #[tokio::test]
    async fn test_list_by_status_newest_first_with_limit() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let first = seed_post(&store, alice.id, ModerationStatus::Approved).await;
        let second = seed_post(&store, alice.id, ModerationStatus::Approved).await;
        seed_post(&store, alice.id, ModerationStatus::Pending).await;

        let all = store
            .list_by_status(ModerationStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let limited = store
            .list_by_status(ModerationStatus::Approved, Some(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_missing_session_is_not_found() {
        let store = InMemoryStore::new();
        let result = BaseRepository::<Session, String>::delete(&store, "nope".to_string()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
