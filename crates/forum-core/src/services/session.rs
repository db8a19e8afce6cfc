//! Session manager: server-side sessions with lazy expiry, plus the
//! deprecated legacy user-id credential as a read-only fallback.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::domain::{IdentitySource, Role, Session, UserId};
use crate::error::{DomainError, RepoError};
use crate::ports::{SessionRepository, TokenService, UserRepository};

/// The caller behind a request, as shown to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub user_id: UserId,
    pub role: Role,
    pub photo_url: String,
    pub source: IdentitySource,
}

pub struct SessionManager {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    legacy_tokens: Arc<dyn TokenService>,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        legacy_tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            sessions,
            users,
            legacy_tokens,
        }
    }

    /// Open a session for an existing user.
    pub async fn create_session(&self, user_id: UserId, ttl: Duration) -> Result<Session, DomainError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::not_found("user", user_id));
        }

        let session = Session::open(user_id, ttl, Utc::now());
        self.sessions.insert(session.clone()).await?;

        tracing::info!(user_id, expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Resolve a session token to its user.
    ///
    /// An expired session is deleted on this read and reported as `Expired`;
    /// later reads of the same token get `NotFound`.
    pub async fn resolve_session(&self, token: &str) -> Result<UserId, DomainError> {
        let Some(session) = self.sessions.find_by_id(token.to_string()).await? else {
            return Err(DomainError::not_found("session", "<token>"));
        };

        if !session.is_valid_at(Utc::now()) {
            self.destroy_session(token).await?;
            tracing::debug!(user_id = session.user_id, "Expired session removed");
            return Err(DomainError::Expired);
        }

        Ok(session.user_id)
    }

    /// Delete a session. Deleting an absent session is a no-op.
    pub async fn destroy_session(&self, token: &str) -> Result<(), DomainError> {
        match self.sessions.delete(token.to_string()).await {
            Ok(()) | Err(RepoError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the caller from whichever credentials the request carries.
    ///
    /// A valid session always wins. Only when there is none is the legacy
    /// credential consulted, and it is honoured only for an existing user
    /// with a photo set.
    pub async fn resolve_identity(
        &self,
        session_token: Option<&str>,
        legacy_token: Option<&str>,
    ) -> Result<Option<ResolvedIdentity>, DomainError> {
        if let Some(token) = session_token.filter(|t| !t.is_empty()) {
            match self.resolve_session(token).await {
                Ok(user_id) => {
                    if let Some(user) = self.users.find_by_id(user_id).await? {
                        return Ok(Some(ResolvedIdentity {
                            user_id: user.id,
                            role: user.role,
                            photo_url: user.photo_url(),
                            source: IdentitySource::Session,
                        }));
                    }
                }
                Err(DomainError::NotFound { .. } | DomainError::Expired) => {}
                Err(e) => return Err(e),
            }
        }

        match legacy_token.filter(|t| !t.is_empty()) {
            Some(token) => self.resolve_legacy(token).await,
            None => Ok(None),
        }
    }

    async fn resolve_legacy(&self, token: &str) -> Result<Option<ResolvedIdentity>, DomainError> {
        let user_id = match self.legacy_tokens.validate_token(token) {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::debug!(error = %e, "Legacy credential rejected");
                return Ok(None);
            }
        };

        match self.users.find_by_id(user_id).await? {
            Some(user) if !user.photo.is_empty() => {
                tracing::debug!(user_id, "Caller resolved from deprecated legacy credential");
                Ok(Some(ResolvedIdentity {
                    user_id: user.id,
                    role: user.role,
                    photo_url: user.photo_url(),
                    source: IdentitySource::Legacy,
                }))
            }
            _ => Ok(None),
        }
    }
}
