#![allow(dead_code)]

use std::sync::Arc;

use forum_core::ForumServices;
use forum_core::domain::{Post, Role, UserId};
use forum_core::ports::{AuthError, PasswordService, UserRepository};
use forum_infra::{InMemoryStore, JwtConfig, JwtTokenService};

/// Deterministic stand-in for Argon2 so tests stay fast.
pub struct PlainPasswordService;

impl PasswordService for PlainPasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

pub struct Forum {
    pub store: Arc<InMemoryStore>,
    pub services: ForumServices,
    pub legacy_tokens: Arc<JwtTokenService>,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-secret".to_string(),
        expiration_hours: 1,
        issuer: "forum-tests".to_string(),
    }
}

pub fn forum() -> Forum {
    let store = Arc::new(InMemoryStore::new());
    let legacy_tokens = Arc::new(JwtTokenService::new(jwt_config()));
    let services = ForumServices::new(
        store.repositories(),
        Arc::new(PlainPasswordService),
        legacy_tokens.clone(),
    );
    Forum {
        store,
        services,
        legacy_tokens,
    }
}

impl Forum {
    /// Register `name` with email `<name>@example.com` and password `password123`.
    pub async fn member(&self, name: &str) -> UserId {
        self.services
            .identity
            .register(name, &format!("{name}@example.com"), "password123")
            .await
            .unwrap()
            .id
    }

    pub async fn with_role(&self, name: &str, role: Role) -> UserId {
        let id = self.member(name).await;
        self.store.update_role(id, role).await.unwrap();
        id
    }

    pub async fn post_by(&self, author: UserId, title: &str) -> Post {
        self.services
            .content
            .create_post(author, title, "Some content", None)
            .await
            .unwrap()
    }

    pub async fn messages_for(&self, user: UserId) -> Vec<String> {
        self.services
            .notifications
            .list_for_user(user, user)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}
