//! Per-user handlers: notifications, profile and stats.

use actix_web::{HttpResponse, web};

use forum_core::domain::UserId;
use forum_shared::dto::{ClearedResponse, UpdateProfileRequest};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/{id}/notifications - newest first, own only
pub async fn notifications(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let items = state
        .services
        .notifications
        .list_for_user(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(
        items
            .into_iter()
            .map(views::notification)
            .collect::<Vec<_>>(),
    ))
}

/// DELETE /api/users/{id}/notifications
pub async fn clear_notifications(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let removed = state
        .services
        .notifications
        .clear_all(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ClearedResponse { removed }))
}

/// GET /api/users/{id}
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let user = state.services.identity.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::user(user)))
}

/// GET /api/users/{id}/stats
pub async fn stats(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let stats = state
        .services
        .identity
        .user_stats(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views::stats(stats)))
}

/// PUT /api/users/me
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .services
        .identity
        .update_profile(
            identity.user_id,
            &req.username,
            req.photo.as_deref(),
            req.remove_photo,
        )
        .await?;
    Ok(HttpResponse::Ok().json(views::user(user)))
}
