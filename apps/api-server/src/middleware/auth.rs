//! Identity extraction from the `session_id` cookie, with the deprecated
//! `user_id` cookie as a one-read fallback.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;

use forum_core::domain::{IdentitySource, Role, Session, UserId};
use forum_core::services::ResolvedIdentity;

use super::error::AppError;
use crate::config::SessionConfig;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_id";
pub const LEGACY_COOKIE: &str = "user_id";

/// Authenticated caller identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    pub photo_url: String,
    pub source: IdentitySource,
}

impl From<ResolvedIdentity> for Identity {
    fn from(resolved: ResolvedIdentity) -> Self {
        Self {
            user_id: resolved.user_id,
            role: resolved.role,
            photo_url: resolved.photo_url,
            source: resolved.source,
        }
    }
}

async fn resolve(
    state: Option<web::Data<AppState>>,
    session: Option<String>,
    legacy: Option<String>,
) -> Result<Option<Identity>, AppError> {
    let state = state.ok_or_else(|| AppError::Internal("AppState not configured".to_string()))?;
    let resolved = state
        .services
        .sessions
        .resolve_identity(session.as_deref(), legacy.as_deref())
        .await?;
    Ok(resolved.map(Identity::from))
}

fn credentials(req: &HttpRequest) -> (Option<web::Data<AppState>>, Option<String>, Option<String>) {
    (
        req.app_data::<web::Data<AppState>>().cloned(),
        req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()),
        req.cookie(LEGACY_COOKIE).map(|c| c.value().to_string()),
    )
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let (state, session, legacy) = credentials(req);
        Box::pin(async move {
            resolve(state, session, legacy)
                .await?
                .ok_or(AppError::Unauthorized)
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<UserId> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let (state, session, legacy) = credentials(req);
        Box::pin(async move { Ok(OptionalIdentity(resolve(state, session, legacy).await?)) })
    }
}

/// Cookie carrying a freshly created session.
pub fn session_cookie(session: &Session, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.token.clone())
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.ttl_hours))
        .finish()
}

/// Removal cookies for both identity mechanisms.
pub fn clearing_cookies() -> [Cookie<'static>; 2] {
    [SESSION_COOKIE, LEGACY_COOKIE].map(|name| {
        let mut cookie = Cookie::build(name, "").path("/").finish();
        cookie.make_removal();
        cookie
    })
}
