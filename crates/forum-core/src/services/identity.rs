//! Identity store: accounts, credentials and roles.

use std::sync::Arc;

use crate::domain::{
    DEFAULT_PHOTO, EXTERNAL_CREDENTIAL, NewUser, Role, User, UserId, UserStats, VoteValue,
    mask_email,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PasswordService, UserRepository, VoteRepository};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_SUFFIX: u32 = 1000;

pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    votes: Arc<dyn VoteRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        votes: Arc<dyn VoteRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            comments,
            votes,
            passwords,
        }
    }

    /// Create a local account with role `user`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation("Invalid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "Password must be at least 8 characters",
            ));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Conflict("Username already taken".to_string()));
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(password)?;
        let user = self
            .users
            .insert(NewUser::member(
                username.to_string(),
                email.to_string(),
                password_hash,
            ))
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Authenticate with an email (anything containing `@`) or a username.
    ///
    /// `NotFound` and `InvalidCredential` are distinct here; callers must not
    /// reveal which one occurred.
    pub async fn authenticate_local(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<UserId, DomainError> {
        let identifier = identifier.trim();
        let user = if identifier.contains('@') {
            self.users.find_by_email(identifier).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let Some(user) = user else {
            tracing::debug!(identifier = %mask_identifier(identifier), "Login for unknown identity");
            return Err(DomainError::not_found("user", mask_identifier(identifier)));
        };

        if user.is_external() || !self.passwords.verify(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Login rejected");
            return Err(DomainError::InvalidCredential);
        }

        tracing::info!(user_id = user.id, "User authenticated");
        Ok(user.id)
    }

    /// Map an identity confirmed by an external provider to a local account,
    /// creating it on first sight.
    pub async fn resolve_or_create_external_identity(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<UserId, DomainError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(DomainError::validation("Invalid email address"));
        }

        if let Some(user) = self.users.find_by_email(email).await? {
            return Ok(user.id);
        }

        let username = self.available_username(display_name, email).await?;
        let created = self
            .users
            .insert(NewUser::member(
                username,
                email.to_string(),
                EXTERNAL_CREDENTIAL.to_string(),
            ))
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = user.id, email = %mask_email(email), "External identity created");
                Ok(user.id)
            }
            // Lost a race with a concurrent callback for the same email
            Err(RepoError::Constraint(_)) => match self.users.find_by_email(email).await? {
                Some(user) => Ok(user.id),
                None => Err(DomainError::Conflict("Username already taken".to_string())),
            },
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    /// Grant `moderator` to `target`. Admin only; admins themselves are left
    /// alone.
    pub async fn promote(&self, actor: UserId, target: UserId) -> Result<(), DomainError> {
        self.set_role(actor, target, Role::Moderator).await
    }

    /// Reset `target` to `user`. Admin only; admins themselves are left alone.
    pub async fn demote(&self, actor: UserId, target: UserId) -> Result<(), DomainError> {
        self.set_role(actor, target, Role::User).await
    }

    pub async fn list_users(&self, actor: UserId) -> Result<Vec<User>, DomainError> {
        self.require_admin(actor).await?;
        Ok(self.users.list_all().await?)
    }

    /// Change the actor's own username and photo.
    pub async fn update_profile(
        &self,
        actor: UserId,
        username: &str,
        photo: Option<&str>,
        remove_photo: bool,
    ) -> Result<User, DomainError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }

        let current = self.get_user(actor).await?;
        let taken = self
            .users
            .find_by_username(username)
            .await?
            .is_some_and(|other| other.id != actor);
        if taken {
            return Err(DomainError::Conflict("Username already taken".to_string()));
        }

        let photo = if remove_photo {
            DEFAULT_PHOTO.to_string()
        } else {
            match photo.map(str::trim) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => current.photo.clone(),
            }
        };

        self.users.update_profile(actor, username, &photo).await?;
        Ok(User {
            username: username.to_string(),
            photo,
            ..current
        })
    }

    pub async fn user_stats(&self, user_id: UserId) -> Result<UserStats, DomainError> {
        self.get_user(user_id).await?;
        let posts_liked = self
            .votes
            .count_post_votes_by_user(user_id, VoteValue::Like)
            .await?;
        let comments_count = self.comments.count_by_user(user_id).await?;
        Ok(UserStats {
            posts_liked,
            comments_count,
        })
    }

    /// Load the actor and return their role. Unknown actors are `Forbidden`:
    /// the caller resolved an identity that no longer exists.
    async fn actor_role(&self, actor: UserId) -> Result<Role, DomainError> {
        match self.users.find_by_id(actor).await? {
            Some(user) => Ok(user.role),
            None => Err(DomainError::Forbidden),
        }
    }

    async fn require_admin(&self, actor: UserId) -> Result<(), DomainError> {
        match self.actor_role(actor).await? {
            Role::Admin => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }

    async fn set_role(&self, actor: UserId, target: UserId, role: Role) -> Result<(), DomainError> {
        self.require_admin(actor).await?;
        if self.get_user(target).await?.role == Role::Admin {
            return Err(DomainError::Conflict(
                "Admin role cannot be changed".to_string(),
            ));
        }
        self.users.update_role(target, role).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("user", target),
            other => other.into(),
        })?;
        tracing::info!(actor, target, role = %role, "Role changed");
        Ok(())
    }

    async fn available_username(&self, display_name: &str, email: &str) -> Result<String, DomainError> {
        let base = match display_name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };
        let base = if base.is_empty() { "member".to_string() } else { base };

        if self.users.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }
        for suffix in 2..=MAX_USERNAME_SUFFIX {
            let candidate = format!("{base}-{suffix}");
            if self.users.find_by_username(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(DomainError::Conflict("Username already taken".to_string()))
    }
}

fn mask_identifier(identifier: &str) -> String {
    if identifier.contains('@') {
        mask_email(identifier)
    } else {
        identifier.to_string()
    }
}
