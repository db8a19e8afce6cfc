use serde::{Deserialize, Serialize};

use super::{CommentId, PostId, UserId};

pub type VoteId = i64;

/// What a vote is cast on. Exactly one of post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum VoteTarget {
    Post(PostId),
    Comment(CommentId),
}

impl VoteTarget {
    pub fn post_id(&self) -> Option<PostId> {
        match self {
            VoteTarget::Post(id) => Some(*id),
            VoteTarget::Comment(_) => None,
        }
    }

    pub fn comment_id(&self) -> Option<CommentId> {
        match self {
            VoteTarget::Comment(id) => Some(*id),
            VoteTarget::Post(_) => None,
        }
    }
}

/// Signed vote value. There is deliberately no neutral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum VoteValue {
    Like,
    Dislike,
}

impl VoteValue {
    pub fn as_i32(&self) -> i32 {
        match self {
            VoteValue::Like => 1,
            VoteValue::Dislike => -1,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Like),
            -1 => Ok(VoteValue::Dislike),
            other => Err(format!("vote value must be 1 or -1, got {other}")),
        }
    }
}

impl From<VoteValue> for i32 {
    fn from(value: VoteValue) -> Self {
        value.as_i32()
    }
}

/// One voter's vote on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub user_id: UserId,
    pub target: VoteTarget,
    pub value: VoteValue,
}

/// Aggregates derived from the ledger on read; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub likes: u64,
    pub dislikes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_value_from_i32() {
        assert_eq!(VoteValue::try_from(1).unwrap(), VoteValue::Like);
        assert_eq!(VoteValue::try_from(-1).unwrap(), VoteValue::Dislike);
        assert!(VoteValue::try_from(0).is_err());
        assert!(VoteValue::try_from(2).is_err());
    }

    #[test]
    fn test_target_ids_are_exclusive() {
        let target = VoteTarget::Comment(3);
        assert_eq!(target.comment_id(), Some(3));
        assert_eq!(target.post_id(), None);
    }
}
