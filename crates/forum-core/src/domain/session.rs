use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Server-side session record keyed by an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `user_id` expiring `ttl` from `now`.
    ///
    /// The token is 122 bits from the OS CSPRNG (UUID v4), hex encoded.
    pub fn open(user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: now + ttl,
        }
    }

    /// A session is valid strictly before its expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Session,
    /// Signed user-id credential from before server-side sessions existed.
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ttl_is_never_valid() {
        let now = Utc::now();
        let session = Session::open(7, Duration::zero(), now);
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let session = Session::open(7, Duration::hours(1), now);
        assert!(session.is_valid_at(now + Duration::minutes(59)));
        assert!(!session.is_valid_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let now = Utc::now();
        let a = Session::open(1, Duration::hours(1), now);
        let b = Session::open(1, Duration::hours(1), now);
        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 32);
    }
}
