mod common;

use std::sync::Arc;

use forum_core::domain::{DEFAULT_PHOTO, NewUser, Role, VoteTarget, VoteValue};
use forum_core::ports::UserRepository;
use forum_core::{DomainError, ForumServices};
use forum_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use common::{forum, jwt_config};

#[tokio::test]
async fn test_register_creates_member_with_default_photo() {
    let forum = forum();

    let user = forum
        .services
        .identity
        .register("  alice ", " alice@example.com", "password123")
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::User);
    assert_eq!(user.photo, DEFAULT_PHOTO);
    assert_ne!(user.password_hash, "password123");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let forum = forum();
    forum.member("alice").await;
    let identity = &forum.services.identity;

    let same_name = identity
        .register("alice", "other@example.com", "password123")
        .await;
    assert!(matches!(same_name, Err(DomainError::Conflict(_))));

    let same_email = identity
        .register("alicia", "alice@example.com", "password123")
        .await;
    assert!(matches!(same_email, Err(DomainError::Conflict(_))));

    let empty_name = identity.register("  ", "x@example.com", "password123").await;
    assert!(matches!(empty_name, Err(DomainError::Validation(_))));

    let short_password = identity.register("bob", "bob@example.com", "short").await;
    assert!(matches!(short_password, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_authenticate_by_email_or_username() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let identity = &forum.services.identity;

    assert_eq!(
        identity
            .authenticate_local("alice@example.com", "password123")
            .await
            .unwrap(),
        alice
    );
    assert_eq!(
        identity
            .authenticate_local("alice", "password123")
            .await
            .unwrap(),
        alice
    );
}

#[tokio::test]
async fn test_authenticate_failures_are_distinct_internally() {
    let forum = forum();
    forum.member("alice").await;
    let identity = &forum.services.identity;

    let wrong_password = identity.authenticate_local("alice", "nope-nope").await;
    assert!(matches!(wrong_password, Err(DomainError::InvalidCredential)));

    let unknown = identity
        .authenticate_local("ghost@example.com", "password123")
        .await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_unreadable_stored_hash_is_a_plain_credential_failure() {
    let store = Arc::new(InMemoryStore::new());
    let services = ForumServices::new(
        store.repositories(),
        Arc::new(Argon2PasswordService::new()),
        Arc::new(JwtTokenService::new(jwt_config())),
    );
    store
        .insert(NewUser::member(
            "old".to_string(),
            "old@example.com".to_string(),
            "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy".to_string(),
        ))
        .await
        .unwrap();

    for identifier in ["old@example.com", "old"] {
        let result = services
            .identity
            .authenticate_local(identifier, "wrong")
            .await;
        assert!(matches!(result, Err(DomainError::InvalidCredential)));
    }
}

#[tokio::test]
async fn test_external_identity_is_created_once_and_cannot_log_in() {
    let forum = forum();
    let identity = &forum.services.identity;

    let first = identity
        .resolve_or_create_external_identity("carol@example.com", "Carol")
        .await
        .unwrap();
    let again = identity
        .resolve_or_create_external_identity("carol@example.com", "Carol")
        .await
        .unwrap();
    assert_eq!(first, again);

    let user = identity.get_user(first).await.unwrap();
    assert_eq!(user.username, "Carol");
    assert_eq!(user.role, Role::User);
    assert_eq!(user.photo, DEFAULT_PHOTO);

    let login = identity.authenticate_local("carol@example.com", "!external").await;
    assert!(matches!(login, Err(DomainError::InvalidCredential)));
}

#[tokio::test]
async fn test_external_identity_username_gets_suffix_when_taken() {
    let forum = forum();
    forum.member("dave").await;

    let id = forum
        .services
        .identity
        .resolve_or_create_external_identity("dave.other@example.com", "dave")
        .await
        .unwrap();

    let user = forum.services.identity.get_user(id).await.unwrap();
    assert_eq!(user.username, "dave-2");
}

#[tokio::test]
async fn test_external_identity_falls_back_to_email_local_part() {
    let forum = forum();

    let id = forum
        .services
        .identity
        .resolve_or_create_external_identity("erin@example.com", "  ")
        .await
        .unwrap();

    let user = forum.services.identity.get_user(id).await.unwrap();
    assert_eq!(user.username, "erin");
}

#[tokio::test]
async fn test_only_admin_changes_roles() {
    let forum = forum();
    let admin = forum.with_role("root", Role::Admin).await;
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;
    let identity = &forum.services.identity;

    let denied = identity.promote(alice, bob).await;
    assert!(matches!(denied, Err(DomainError::Forbidden)));

    identity.promote(admin, bob).await.unwrap();
    assert_eq!(identity.get_user(bob).await.unwrap().role, Role::Moderator);

    identity.demote(admin, bob).await.unwrap();
    assert_eq!(identity.get_user(bob).await.unwrap().role, Role::User);

    let other_admin = forum.with_role("root2", Role::Admin).await;
    for result in [
        identity.promote(admin, other_admin).await,
        identity.demote(admin, other_admin).await,
    ] {
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
    assert_eq!(
        identity.get_user(other_admin).await.unwrap().role,
        Role::Admin
    );

    let missing = identity.promote(admin, 9_999).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    assert!(matches!(
        identity.list_users(alice).await,
        Err(DomainError::Forbidden)
    ));
    assert_eq!(identity.list_users(admin).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_update_profile() {
    let forum = forum();
    let alice = forum.member("alice").await;
    forum.member("bob").await;
    let identity = &forum.services.identity;

    let updated = identity
        .update_profile(alice, "alice2", Some("https://cdn.example.com/a.png"), false)
        .await
        .unwrap();
    assert_eq!(updated.username, "alice2");
    assert_eq!(updated.photo_url(), "https://cdn.example.com/a.png");

    let kept = identity
        .update_profile(alice, "alice2", None, false)
        .await
        .unwrap();
    assert_eq!(kept.photo, "https://cdn.example.com/a.png");

    let removed = identity
        .update_profile(alice, "alice2", None, true)
        .await
        .unwrap();
    assert_eq!(removed.photo, DEFAULT_PHOTO);
    assert_eq!(removed.photo_url(), "/static/images/profil/profil.png");

    let taken = identity.update_profile(alice, "bob", None, false).await;
    assert!(matches!(taken, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_user_stats_counts_liked_posts_and_comments() {
    let forum = forum();
    let admin = forum.with_role("root", Role::Admin).await;
    let alice = forum.member("alice").await;
    let post = forum.post_by(admin, "Welcome").await;
    let other = forum.post_by(admin, "Rules").await;
    let services = &forum.services;

    services
        .votes
        .cast_vote(alice, VoteTarget::Post(post.id), VoteValue::Like)
        .await
        .unwrap();
    services
        .votes
        .cast_vote(alice, VoteTarget::Post(other.id), VoteValue::Dislike)
        .await
        .unwrap();
    let comment = services
        .content
        .add_comment(post.id, alice, "hello")
        .await
        .unwrap();
    services
        .votes
        .cast_vote(alice, VoteTarget::Comment(comment.id), VoteValue::Like)
        .await
        .unwrap();

    let stats = services.identity.user_stats(alice).await.unwrap();
    assert_eq!(stats.posts_liked, 1);
    assert_eq!(stats.comments_count, 1);

    let unknown = services.identity.user_stats(9_999).await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));
}
