//! Application services - the forum's content lifecycle and access control.
//!
//! Every mutating operation takes the acting user's id and re-reads that
//! user's role from the identity store; no service trusts a caller-supplied
//! role. Services hold store handles only, no in-process mutable state.

mod content;
mod identity;
mod moderation;
mod notifications;
mod session;
mod votes;

use std::sync::Arc;

pub use content::{CommentView, ContentService, PostView};
pub use identity::IdentityService;
pub use moderation::ModerationEngine;
pub use notifications::{AfterCommit, Dispatch, Notifier};
pub use session::{ResolvedIdentity, SessionManager};
pub use votes::VoteLedger;

use crate::ports::{PasswordService, Repositories, TokenService};

/// All services wired over one set of store handles.
#[derive(Clone)]
pub struct ForumServices {
    pub identity: Arc<IdentityService>,
    pub sessions: Arc<SessionManager>,
    pub content: Arc<ContentService>,
    pub votes: Arc<VoteLedger>,
    pub moderation: Arc<ModerationEngine>,
    pub notifications: Arc<Notifier>,
}

impl ForumServices {
    pub fn new(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        legacy_tokens: Arc<dyn TokenService>,
    ) -> Self {
        let notifications = Arc::new(Notifier::new(
            repos.notifications.clone(),
            repos.users.clone(),
        ));
        let votes = Arc::new(VoteLedger::new(
            repos.votes.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
            repos.users.clone(),
        ));
        let moderation = Arc::new(ModerationEngine::new(
            repos.posts.clone(),
            repos.users.clone(),
            notifications.clone(),
        ));
        let content = Arc::new(ContentService::new(
            repos.posts.clone(),
            repos.comments.clone(),
            repos.users.clone(),
            votes.clone(),
            moderation.clone(),
            notifications.clone(),
        ));
        let identity = Arc::new(IdentityService::new(
            repos.users.clone(),
            repos.comments.clone(),
            repos.votes.clone(),
            passwords,
        ));
        let sessions = Arc::new(SessionManager::new(
            repos.sessions,
            repos.users,
            legacy_tokens,
        ));

        Self {
            identity,
            sessions,
            content,
            votes,
            moderation,
            notifications,
        }
    }
}
