//! Domain → wire conversions.

use forum_core::domain::{IdentitySource, Notification, Post, User, UserStats, VoteCounts};
use forum_core::services::{CommentView, PostView};
use forum_shared::dto::{
    CommentResponse, IdentityResponse, NotificationResponse, PostResponse, UserResponse,
    UserStatsResponse, VoteCountsResponse,
};

use crate::middleware::auth::Identity;

pub fn user(user: User) -> UserResponse {
    UserResponse {
        photo_url: user.photo_url(),
        id: user.id,
        username: user.username,
        role: user.role.to_string(),
        created_at: user.created_at,
    }
}

pub fn identity(identity: Identity) -> IdentityResponse {
    IdentityResponse {
        user_id: identity.user_id,
        role: identity.role.to_string(),
        photo_url: identity.photo_url,
        source: match identity.source {
            IdentitySource::Session => "session",
            IdentitySource::Legacy => "legacy",
        }
        .to_string(),
    }
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        likes,
        dislikes,
        modified,
        editable,
    } = view;
    PostResponse {
        id: post.id,
        user_id: post.user_id,
        title: post.title,
        content: post.content,
        image_path: post.image_path,
        moderation_status: post.moderation_status.to_string(),
        created_at: post.created_at,
        modified_at: post.modified_at,
        likes,
        dislikes,
        modified,
        editable,
    }
}

/// A post the caller just wrote or moderated; counts are not loaded.
pub fn bare_post(post: Post, editable: bool) -> PostResponse {
    let modified = post.is_modified();
    self::post(PostView {
        post,
        likes: 0,
        dislikes: 0,
        modified,
        editable,
    })
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        user_id: view.comment.user_id,
        content: view.comment.content,
        created_at: view.comment.created_at,
        likes: view.likes,
        dislikes: view.dislikes,
    }
}

pub fn counts(counts: VoteCounts) -> VoteCountsResponse {
    VoteCountsResponse {
        likes: counts.likes,
        dislikes: counts.dislikes,
    }
}

pub fn notification(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id,
        message: n.message,
        post_id: n.post_id,
        comment_id: n.comment_id,
        created_at: n.created_at,
    }
}

pub fn stats(stats: UserStats) -> UserStatsResponse {
    UserStatsResponse {
        posts_liked: stats.posts_liked,
        comments_count: stats.comments_count,
    }
}
