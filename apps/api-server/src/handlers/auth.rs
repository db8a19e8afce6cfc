//! Authentication handlers.

use actix_web::{HttpRequest, HttpResponse, web};

use forum_core::DomainError;
use forum_shared::dto::{LoginRequest, LoginResponse, RegisterUserRequest};

use super::views;
use crate::middleware::auth::{Identity, SESSION_COOKIE, clearing_cookies, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .services
        .identity
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(views::user(user)))
}

/// POST /api/auth/login
///
/// Unknown identity and wrong password both answer 401 with the same body.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user_id = match state
        .services
        .identity
        .authenticate_local(&req.identifier, &req.password)
        .await
    {
        Ok(user_id) => user_id,
        Err(DomainError::NotFound { .. } | DomainError::InvalidCredential) => {
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    let session = state
        .services
        .sessions
        .create_session(user_id, state.session.ttl())
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session, &state.session))
        .json(LoginResponse {
            user_id,
            expires_at: session.expires_at,
        }))
}

/// POST /api/auth/logout
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        state.services.sessions.destroy_session(cookie.value()).await?;
    }

    let mut response = HttpResponse::NoContent();
    for cookie in clearing_cookies() {
        response.cookie(cookie);
    }
    Ok(response.finish())
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(views::identity(identity)))
}
