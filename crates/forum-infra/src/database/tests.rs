use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use forum_core::domain::{ModerationStatus, Post, Role, User, VoteTarget, VoteValue};
use forum_core::error::RepoError;
use forum_core::ports::{BaseRepository, PostRepository, UserRepository, VoteRepository};

use crate::database::entity::{like, post, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresUserRepository, PostgresVoteRepository,
};

fn post_model(id: i64, status: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        user_id: 7,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        original_content: Some("Content".to_owned()),
        image_path: None,
        moderation_status: status.to_owned(),
        created_at: now.into(),
        modified_at: None,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(42, "pending")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(42).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, 42);
    assert_eq!(post.moderation_status, ModerationStatus::Pending);
    assert!(!post.is_modified());
}

#[tokio::test]
async fn test_unknown_status_is_reported_not_guessed() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(1, "archived")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Result<Option<Post>, RepoError> = repo.find_by_id(1).await;
    assert!(matches!(result, Err(RepoError::Query(_))));
}

#[tokio::test]
async fn test_transition_status_reports_lost_race() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let won = repo
        .transition_status(5, ModerationStatus::Pending, ModerationStatus::Approved)
        .await
        .unwrap();
    let lost = repo
        .transition_status(5, ModerationStatus::Pending, ModerationStatus::Rejected)
        .await
        .unwrap();

    assert!(won);
    assert!(!lost);
}

#[tokio::test]
async fn test_list_staff_maps_roles() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            user::Model {
                id: 1,
                username: "root".to_owned(),
                email: "root@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                role: "admin".to_owned(),
                photo: "profil.png".to_owned(),
                created_at: now.into(),
            },
            user::Model {
                id: 2,
                username: "mod".to_owned(),
                email: "mod@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                role: "moderator".to_owned(),
                photo: "profil.png".to_owned(),
                created_at: now.into(),
            },
        ]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let staff: Vec<User> = repo
        .list_by_roles(&[Role::Moderator, Role::Admin])
        .await
        .unwrap();

    assert_eq!(staff.len(), 2);
    assert_eq!(staff[0].role, Role::Admin);
    assert_eq!(staff[1].role, Role::Moderator);
}

#[tokio::test]
async fn test_update_role_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result = repo.update_role(99, Role::Moderator).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_vote_maps_comment_target() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![like::Model {
            id: 3,
            user_id: 7,
            post_id: None,
            comment_id: Some(11),
            value: -1,
        }]])
        .into_connection();

    let repo = PostgresVoteRepository::new(db);

    let vote = repo
        .find(7, VoteTarget::Comment(11))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(vote.target, VoteTarget::Comment(11));
    assert_eq!(vote.value, VoteValue::Dislike);
}
