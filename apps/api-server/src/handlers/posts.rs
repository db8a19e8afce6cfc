//! Post and per-post comment handlers.

use actix_web::{HttpResponse, web};

use forum_core::domain::{PostEdit, PostId, VoteTarget, VoteValue};
use forum_core::services::CommentView;
use forum_shared::dto::{
    CommentRequest, CreatePostRequest, EditPostRequest, RecentQuery, VoteRequest,
};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.services.content.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts.into_iter().map(views::post).collect::<Vec<_>>()))
}

/// GET /api/posts/recent?limit=N
pub async fn recent(
    state: web::Data<AppState>,
    query: web::Query<RecentQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.services.content.recent_posts(query.limit).await?;
    Ok(HttpResponse::Ok().json(posts.into_iter().map(views::post).collect::<Vec<_>>()))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let view = state
        .services
        .content
        .get_post(path.into_inner(), viewer.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(views::post(view)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .services
        .content
        .create_post(
            identity.user_id,
            &req.title,
            &req.content,
            req.image_path.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Created().json(views::bare_post(post, true)))
}

/// PUT /api/posts/{id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    body: web::Json<EditPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .services
        .content
        .edit_post(
            path.into_inner(),
            identity.user_id,
            PostEdit {
                title: req.title,
                content: req.content,
                image_path: req.image_path,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(views::bare_post(post, true)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .content
        .delete_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/report
pub async fn report(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .moderation
        .report_post(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Accepted().finish())
}

/// GET /api/posts/{id}/comments
pub async fn comments(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let comments = state
        .services
        .content
        .comments_for_post(path.into_inner(), viewer.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(comments.into_iter().map(views::comment).collect::<Vec<_>>()))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .services
        .content
        .add_comment(path.into_inner(), identity.user_id, &body.content)
        .await?;
    Ok(HttpResponse::Created().json(views::comment(CommentView {
        comment,
        likes: 0,
        dislikes: 0,
    })))
}

/// POST /api/posts/{id}/vote
pub async fn vote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    cast(&state, identity, VoteTarget::Post(path.into_inner()), body.value).await
}

/// Record a vote and answer with the target's fresh counts.
pub(super) async fn cast(
    state: &AppState,
    identity: Identity,
    target: VoteTarget,
    value: i32,
) -> AppResult<HttpResponse> {
    let value = VoteValue::try_from(value).map_err(AppError::BadRequest)?;
    let votes = &state.services.votes;
    votes.cast_vote(identity.user_id, target, value).await?;
    let counts = votes.counts(target).await?;
    Ok(HttpResponse::Ok().json(views::counts(counts)))
}
