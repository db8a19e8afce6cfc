//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use forum_core::domain::{
    Comment, ModerationStatus, NewComment, NewNotification, NewPost, NewUser, Notification, Post,
    PostId, PostRevision, Role, Session, User, UserId, Vote, VoteId, VoteTarget, VoteValue,
    mask_email,
};
use forum_core::error::RepoError;
use forum_core::ports::{
    CommentRepository, NotificationRepository, PostRepository, Repositories, SessionRepository,
    UserRepository, VoteRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::notification::{self, Entity as NotificationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::session::{self, Entity as SessionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, convert_all, db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL session repository.
pub type PostgresSessionRepository = PostgresBaseRepository<SessionEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL vote repository over the `likes` table.
pub type PostgresVoteRepository = PostgresBaseRepository<LikeEntity>;

/// PostgreSQL notification repository.
pub type PostgresNotificationRepository = PostgresBaseRepository<NotificationEntity>;

/// Every PostgreSQL repository over one connection pool.
pub struct PostgresStore {
    db: DbConn,
}

impl PostgresStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PostgresUserRepository::new(self.db.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(self.db.clone())),
            posts: Arc::new(PostgresPostRepository::new(self.db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(self.db.clone())),
            votes: Arc::new(PostgresVoteRepository::new(self.db.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(self.db.clone())),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(User::try_from)
            .transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            photo: Set(user.photo),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        User::try_from(model)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(User::try_from).transpose()
    }

    async fn update_role(&self, id: UserId, role: Role) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Role, Expr::value(role.as_str()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        photo: &str,
    ) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Username, Expr::value(username))
            .col_expr(user::Column::Photo, Expr::value(photo))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        convert_all(models)
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, RepoError> {
        let models = UserEntity::find()
            .filter(user::Column::Role.is_in(roles.iter().map(Role::as_str)))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        convert_all(models)
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert(&self, session: Session) -> Result<(), RepoError> {
        session::ActiveModel {
            session_id: Set(session.token),
            user_id: Set(session.user_id),
            expires_at: Set(session.expires_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            user_id: Set(new_post.user_id),
            title: Set(new_post.title),
            original_content: Set(Some(new_post.content.clone())),
            content: Set(new_post.content),
            image_path: Set(new_post.image_path),
            moderation_status: Set(new_post.moderation_status.as_str().to_string()),
            created_at: Set(Utc::now().into()),
            modified_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Post::try_from(model)
    }

    async fn update_revision(
        &self,
        id: PostId,
        revision: PostRevision,
    ) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        active.title = Set(revision.title);
        active.content = Set(revision.content);
        active.original_content = Set(Some(revision.original_content));
        active.image_path = Set(revision.image_path);
        active.modified_at = Set(Some(revision.modified_at.into()));

        let model = active.update(&self.db).await.map_err(db_err)?;
        Post::try_from(model)
    }

    async fn transition_status(
        &self,
        id: PostId,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::ModerationStatus, Expr::value(to.as_str()))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::ModerationStatus.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected == 1)
    }

    async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::ModerationStatus.eq(status.as_str()))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        convert_all(models)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn insert(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            user_id: Set(new_comment.user_id),
            content: Set(new_comment.content),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Comment::try_from(model)
    }

    async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        convert_all(models)
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

fn target_condition(target: VoteTarget) -> Condition {
    match target {
        VoteTarget::Post(id) => Condition::all()
            .add(like::Column::PostId.eq(id))
            .add(like::Column::CommentId.is_null()),
        VoteTarget::Comment(id) => Condition::all()
            .add(like::Column::CommentId.eq(id))
            .add(like::Column::PostId.is_null()),
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn find(&self, user_id: UserId, target: VoteTarget) -> Result<Option<Vote>, RepoError> {
        let result = LikeEntity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(target_condition(target))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(Vote::try_from).transpose()
    }

    async fn insert(
        &self,
        user_id: UserId,
        target: VoteTarget,
        value: VoteValue,
    ) -> Result<Vote, RepoError> {
        let model = like::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(target.post_id()),
            comment_id: Set(target.comment_id()),
            value: Set(value.as_i32()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Vote::try_from(model)
    }

    async fn update_value(&self, id: VoteId, value: VoteValue) -> Result<(), RepoError> {
        let result = LikeEntity::update_many()
            .col_expr(like::Column::Value, Expr::value(value.as_i32()))
            .filter(like::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count(&self, target: VoteTarget, value: VoteValue) -> Result<u64, RepoError> {
        LikeEntity::find()
            .filter(target_condition(target))
            .filter(like::Column::Value.eq(value.as_i32()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count_post_votes_by_user(
        &self,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<u64, RepoError> {
        LikeEntity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.is_not_null())
            .filter(like::Column::Value.eq(value.as_i32()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, new: NewNotification) -> Result<Notification, RepoError> {
        let model = notification::ActiveModel {
            user_id: Set(new.user_id),
            message: Set(new.message),
            post_id: Set(new.post_id),
            comment_id: Set(new.comment_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Notification::try_from(model)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepoError> {
        let models = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        convert_all(models)
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<u64, RepoError> {
        let result = NotificationEntity::delete_many()
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}
