//! Moderation dashboard handlers. Staff only; the core enforces the role.

use actix_web::{HttpResponse, web};

use forum_core::domain::{CommentId, PostId};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/moderation/pending
pub async fn pending(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state
        .services
        .moderation
        .pending_posts(identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(
        posts
            .into_iter()
            .map(|post| views::bare_post(post, false))
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/moderation/posts/{id}/approve
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .moderation
        .approve(identity.user_id, path.into_inner())
        .await?;
    let editable = post.user_id == identity.user_id;
    Ok(HttpResponse::Ok().json(views::bare_post(post, editable)))
}

/// POST /api/moderation/posts/{id}/reject
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .moderation
        .reject(identity.user_id, path.into_inner())
        .await?;
    let editable = post.user_id == identity.user_id;
    Ok(HttpResponse::Ok().json(views::bare_post(post, editable)))
}

/// DELETE /api/moderation/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<CommentId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .content
        .delete_comment_as_moderator(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
