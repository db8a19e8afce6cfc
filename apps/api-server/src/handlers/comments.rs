//! Comment handlers.

use actix_web::{HttpResponse, web};

use forum_core::domain::{CommentId, VoteTarget};
use forum_shared::dto::VoteRequest;

use super::posts::cast;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// DELETE /api/comments/{id} - own comments only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<CommentId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .content
        .delete_comment(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/comments/{id}/vote
pub async fn vote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<CommentId>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    cast(&state, identity, VoteTarget::Comment(path.into_inner()), body.value).await
}
