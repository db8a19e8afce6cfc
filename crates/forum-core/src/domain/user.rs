use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo reference every account starts with.
pub const DEFAULT_PHOTO: &str = "profil.png";

/// Credential stored for identities created through an external provider.
/// It is not a valid password hash, so such accounts can never log in locally.
pub const EXTERNAL_CREDENTIAL: &str = "!external";

const PHOTO_BASE_PATH: &str = "/static/images/profil/";

pub type UserId = i64;

/// Access tier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Moderators and admins may moderate, and delete any content.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User entity - a registered forum member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account was created by an external provider callback.
    pub fn is_external(&self) -> bool {
        self.password_hash == EXTERNAL_CREDENTIAL
    }

    /// URL the photo is displayed from.
    pub fn photo_url(&self) -> String {
        let photo = if self.photo.is_empty() {
            DEFAULT_PHOTO
        } else {
            self.photo.as_str()
        };
        if photo.starts_with("http") {
            photo.to_string()
        } else {
            format!("{PHOTO_BASE_PATH}{photo}")
        }
    }
}

/// Fields needed to insert a user; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub photo: String,
}

impl NewUser {
    /// A regular member with the default photo.
    pub fn member(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
            role: Role::User,
            photo: DEFAULT_PHOTO.to_string(),
        }
    }
}

/// Activity summary shown on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub posts_liked: u64,
    pub comments_count: u64,
}

/// Mask an email for logging to avoid PII in logs.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match (chars.next(), chars.next()) {
                (Some(first), Some(_)) => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_photo(photo: &str) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            photo: photo.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(!Role::User.is_staff());
        assert!(Role::Moderator.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_photo_url() {
        assert_eq!(
            user_with_photo("me.png").photo_url(),
            "/static/images/profil/me.png"
        );
        assert_eq!(
            user_with_photo("https://cdn.example.com/a.jpg").photo_url(),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            user_with_photo("").photo_url(),
            "/static/images/profil/profil.png"
        );
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("alice"), "***");
    }
}
