//! Admin handlers: user listing and role changes.

use actix_web::{HttpResponse, web};

use forum_core::domain::UserId;

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let users = state.services.identity.list_users(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(users.into_iter().map(views::user).collect::<Vec<_>>()))
}

/// POST /api/admin/users/{id}/promote
pub async fn promote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .identity
        .promote(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/admin/users/{id}/demote
pub async fn demote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    state
        .services
        .identity
        .demote(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
