mod common;

use forum_core::DomainError;
use forum_core::domain::{Role, VoteTarget, VoteValue};

use common::forum;

#[tokio::test]
async fn test_vote_upsert_keeps_one_row() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(moderator, "P").await;
    let votes = &forum.services.votes;
    let target = VoteTarget::Post(post.id);

    votes.cast_vote(bob, target, VoteValue::Like).await.unwrap();
    assert_eq!(votes.count_likes(target).await.unwrap(), 1);
    assert_eq!(votes.count_dislikes(target).await.unwrap(), 0);

    votes.cast_vote(bob, target, VoteValue::Like).await.unwrap();
    assert_eq!(votes.count_likes(target).await.unwrap(), 1);

    let flipped = votes
        .cast_vote(bob, target, VoteValue::Dislike)
        .await
        .unwrap();
    assert_eq!(votes.count_likes(target).await.unwrap(), 0);
    assert_eq!(votes.count_dislikes(target).await.unwrap(), 1);
    assert_eq!(flipped.value, VoteValue::Dislike);
}

#[tokio::test]
async fn test_flip_updates_same_row() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(moderator, "P").await;
    let votes = &forum.services.votes;
    let target = VoteTarget::Post(post.id);

    let first = votes.cast_vote(bob, target, VoteValue::Like).await.unwrap();
    let second = votes
        .cast_vote(bob, target, VoteValue::Dislike)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_votes_from_different_users_add_up() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(moderator, "P").await;
    let votes = &forum.services.votes;
    let target = VoteTarget::Post(post.id);

    votes.cast_vote(alice, target, VoteValue::Like).await.unwrap();
    votes.cast_vote(bob, target, VoteValue::Like).await.unwrap();
    votes
        .cast_vote(moderator, target, VoteValue::Dislike)
        .await
        .unwrap();

    let counts = votes.counts(target).await.unwrap();
    assert_eq!(counts.likes, 2);
    assert_eq!(counts.dislikes, 1);
}

#[tokio::test]
async fn test_vote_targets_must_exist_and_be_visible() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let bob = forum.member("bob").await;
    let pending = forum.post_by(alice, "pending").await;
    let votes = &forum.services.votes;

    assert!(matches!(
        votes
            .cast_vote(bob, VoteTarget::Post(pending.id), VoteValue::Like)
            .await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        votes
            .cast_vote(bob, VoteTarget::Comment(9_999), VoteValue::Like)
            .await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        votes
            .cast_vote(9_999, VoteTarget::Post(pending.id), VoteValue::Like)
            .await,
        Err(DomainError::Forbidden)
    ));

    // The author sees their own pending post and may vote on it.
    votes
        .cast_vote(alice, VoteTarget::Post(pending.id), VoteValue::Like)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_comment_votes_follow_parent_post_visibility() {
    let forum = forum();
    let alice = forum.member("alice").await;
    let mallory = forum.member("mallory").await;
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let pending = forum.post_by(alice, "pending").await;
    let comment = forum
        .services
        .content
        .add_comment(pending.id, alice, "my own note")
        .await
        .unwrap();
    let votes = &forum.services.votes;
    let target = VoteTarget::Comment(comment.id);

    let hidden = votes.cast_vote(mallory, target, VoteValue::Dislike).await;
    assert!(matches!(
        hidden,
        Err(DomainError::NotFound { entity_type, .. }) if entity_type == "post"
    ));
    let counts = votes.counts(target).await.unwrap();
    assert_eq!((counts.likes, counts.dislikes), (0, 0));

    // Author and staff still see the post and may vote under it.
    votes.cast_vote(alice, target, VoteValue::Like).await.unwrap();
    votes
        .cast_vote(moderator, target, VoteValue::Like)
        .await
        .unwrap();
    assert_eq!(votes.count_likes(target).await.unwrap(), 2);
}

#[tokio::test]
async fn test_post_and_comment_votes_are_separate() {
    let forum = forum();
    let moderator = forum.with_role("mod", Role::Moderator).await;
    let bob = forum.member("bob").await;
    let post = forum.post_by(moderator, "P").await;
    let comment = forum
        .services
        .content
        .add_comment(post.id, moderator, "c")
        .await
        .unwrap();
    let votes = &forum.services.votes;

    votes
        .cast_vote(bob, VoteTarget::Post(post.id), VoteValue::Like)
        .await
        .unwrap();
    votes
        .cast_vote(bob, VoteTarget::Comment(comment.id), VoteValue::Dislike)
        .await
        .unwrap();

    let on_post = votes.counts(VoteTarget::Post(post.id)).await.unwrap();
    let on_comment = votes.counts(VoteTarget::Comment(comment.id)).await.unwrap();
    assert_eq!((on_post.likes, on_post.dislikes), (1, 0));
    assert_eq!((on_comment.likes, on_comment.dislikes), (0, 1));
}
