use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, UserId};

pub type PostId = i64;

/// Moderation state of a post.
///
/// `Approved` and `Rejected` are terminal: resubmitting creates a new post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    /// Status a post gets when its author has `role`.
    pub fn initial_for(role: Role) -> Self {
        if role.is_staff() {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Pending
        }
    }

    pub fn can_transition_to(&self, next: ModerationStatus) -> bool {
        matches!(
            (self, next),
            (
                ModerationStatus::Pending,
                ModerationStatus::Approved | ModerationStatus::Rejected
            )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(format!("unknown moderation status: {other}")),
        }
    }
}

/// Post entity - user-submitted content gated by moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    /// Revision baseline: the first published content. `None` only for rows
    /// written before revision tracking; the first edit backfills it.
    pub original_content: Option<String>,
    pub image_path: Option<String>,
    pub moderation_status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Whether the post displays as edited. An edit that restores the
    /// original content is not flagged.
    pub fn is_modified(&self) -> bool {
        match (&self.modified_at, self.original_content.as_deref()) {
            (Some(_), Some(original)) => !original.is_empty() && original != self.content,
            _ => false,
        }
    }

    /// Restrictive visibility: approved posts are public, anything else is
    /// only visible to its author and to staff.
    pub fn is_visible_to(&self, viewer: Option<(UserId, Role)>) -> bool {
        if self.moderation_status == ModerationStatus::Approved {
            return true;
        }
        match viewer {
            Some((id, role)) => id == self.user_id || role.is_staff(),
            None => false,
        }
    }

    /// Baseline to keep when this post is edited.
    pub fn revision_baseline(&self) -> String {
        match self.original_content.as_deref() {
            Some(original) if !original.is_empty() => original.to_string(),
            _ => self.content.clone(),
        }
    }
}

/// Fields needed to insert a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub image_path: Option<String>,
    pub moderation_status: ModerationStatus,
}

/// Content written by an edit. Built by the content service from the
/// existing row and the caller's changes.
#[derive(Debug, Clone)]
pub struct PostRevision {
    pub title: String,
    pub content: String,
    pub original_content: String,
    pub image_path: Option<String>,
    pub modified_at: DateTime<Utc>,
}

/// Caller's edit request. Omitted title and image keep the current values.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: String,
    pub image_path: Option<String>,
}
