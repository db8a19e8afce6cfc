mod common;

use forum_core::DomainError;
use forum_core::domain::{ModerationStatus, Role};

use common::forum;

#[tokio::test]
async fn test_initial_status_follows_author_role() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let admin = forum.with_role("root", Role::Admin).await;

    assert_eq!(
        forum.post_by(alice, "a").await.moderation_status,
        ModerationStatus::Pending
    );
    assert_eq!(
        forum.post_by(moderator, "m").await.moderation_status,
        ModerationStatus::Approved
    );
    assert_eq!(
        forum.post_by(admin, "r").await.moderation_status,
        ModerationStatus::Approved
    );
}

#[tokio::test]
async fn test_pending_post_is_approved_and_published() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let services = &forum.services;

    let post = services
        .content
        .create_post(alice, "T", "C", None)
        .await
        .unwrap();
    assert_eq!(post.moderation_status, ModerationStatus::Pending);

    let pending = services.moderation.pending_posts(moderator).await.unwrap();
    assert!(pending.iter().any(|p| p.id == post.id));
    assert!(services.content.list_posts().await.unwrap().is_empty());

    let approved = services.moderation.approve(moderator, post.id).await.unwrap();
    assert_eq!(approved.moderation_status, ModerationStatus::Approved);

    let listed = services.content.list_posts().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].post.id, post.id);

    let messages = forum.messages_for(alice).await;
    assert!(messages.iter().any(|m| m.contains("approved")));
}

#[tokio::test]
async fn test_pending_creation_notifies_author_and_every_staff_member() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let admin = forum.with_role("root", Role::Admin).await;
    let bystander = forum.member("bob").await;

    forum.post_by(alice, "Hello").await;

    assert_eq!(
        forum.messages_for(alice).await,
        vec!["Your post \"Hello\" has been submitted for review.".to_string()]
    );
    for staff in [moderator, admin] {
        assert_eq!(
            forum.messages_for(staff).await,
            vec!["New post \"Hello\" is pending review.".to_string()]
        );
    }
    assert!(forum.messages_for(bystander).await.is_empty());
}

#[tokio::test]
async fn test_staff_posts_notify_nobody() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let admin = forum.with_role("root", Role::Admin).await;

    forum.post_by(moderator, "Announcement").await;

    assert!(forum.messages_for(moderator).await.is_empty());
    assert!(forum.messages_for(admin).await.is_empty());
}

#[tokio::test]
async fn test_non_staff_cannot_moderate() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(alice, "Mine").await;
    let moderation = &forum.services.moderation;

    assert!(matches!(
        moderation.approve(bob, post.id).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        moderation.reject(alice, post.id).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        moderation.pending_posts(bob).await,
        Err(DomainError::Forbidden)
    ));
    assert!(matches!(
        moderation.approve(9_999, post.id).await,
        Err(DomainError::Forbidden)
    ));

    let stored = forum
        .services
        .content
        .get_post(post.id, Some(alice))
        .await
        .unwrap();
    assert_eq!(stored.post.moderation_status, ModerationStatus::Pending);
}

#[tokio::test]
async fn test_reject_is_terminal() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let post = forum.post_by(alice, "Spam").await;
    let moderation = &forum.services.moderation;

    let rejected = moderation.reject(moderator, post.id).await.unwrap();
    assert_eq!(rejected.moderation_status, ModerationStatus::Rejected);

    let again = moderation.approve(moderator, post.id).await;
    assert!(matches!(again, Err(DomainError::Conflict(_))));

    let missing = moderation.approve(moderator, 9_999).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    assert!(
        forum
            .messages_for(alice)
            .await
            .contains(&"Your post \"Spam\" has been rejected.".to_string())
    );
}

#[tokio::test]
async fn test_pending_posts_newest_first() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let first = forum.post_by(alice, "first").await;
    let second = forum.post_by(alice, "second").await;

    let pending = forum
        .services
        .moderation
        .pending_posts(moderator)
        .await
        .unwrap();

    assert_eq!(
        pending.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
}

#[tokio::test]
async fn test_role_change_applies_to_next_fan_out() {
    let forum = forum();
    let admin = forum.with_role("root", Role::Admin).await;
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;

    forum.post_by(alice, "before").await;
    assert!(forum.messages_for(bob).await.is_empty());

    forum.services.identity.promote(admin, bob).await.unwrap();
    forum.post_by(alice, "after").await;

    assert_eq!(
        forum.messages_for(bob).await,
        vec!["New post \"after\" is pending review.".to_string()]
    );
}

#[tokio::test]
async fn test_report_notifies_staff_and_acknowledges_reporter() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let alice = forum.member("alice").await;
    let post = forum.post_by(moderator, "Heated").await;

    forum
        .services
        .moderation
        .report_post(alice, post.id)
        .await
        .unwrap();

    assert_eq!(
        forum.messages_for(moderator).await,
        vec![format!(
            "Post \"Heated\" (ID:{}) was reported by alice (ID:{})",
            post.id, alice
        )]
    );
    assert_eq!(
        forum.messages_for(alice).await,
        vec!["Your report has been sent to the moderators.".to_string()]
    );
}

#[tokio::test]
async fn test_cannot_report_invisible_post() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(alice, "pending").await;

    let result = forum.services.moderation.report_post(bob, post.id).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}
