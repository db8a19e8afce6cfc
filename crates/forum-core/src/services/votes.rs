//! Vote ledger: one signed vote per (voter, target), counts derived on read.

use std::sync::Arc;

use crate::domain::{UserId, Vote, VoteCounts, VoteTarget, VoteValue};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository, UserRepository, VoteRepository};

pub struct VoteLedger {
    votes: Arc<dyn VoteRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
}

impl VoteLedger {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            votes,
            posts,
            comments,
            users,
        }
    }

    /// Record `voter`'s vote on `target`, replacing any earlier vote.
    ///
    /// Re-casting the same value rewrites the row unchanged; there is no way
    /// back to "no vote".
    pub async fn cast_vote(
        &self,
        voter: UserId,
        target: VoteTarget,
        value: VoteValue,
    ) -> Result<Vote, DomainError> {
        self.check_target(voter, target).await?;

        // Check-then-act: a concurrent insert for the same pair is caught by
        // the store's uniqueness constraint and retried as an update.
        if let Some(existing) = self.votes.find(voter, target).await? {
            return self.overwrite(existing, value).await;
        }

        match self.votes.insert(voter, target, value).await {
            Ok(vote) => {
                tracing::debug!(voter, ?target, value = value.as_i32(), "Vote recorded");
                Ok(vote)
            }
            Err(RepoError::Constraint(_)) => match self.votes.find(voter, target).await? {
                Some(existing) => self.overwrite(existing, value).await,
                None => Err(DomainError::Conflict("Vote could not be recorded".to_string())),
            },
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_likes(&self, target: VoteTarget) -> Result<u64, DomainError> {
        Ok(self.votes.count(target, VoteValue::Like).await?)
    }

    pub async fn count_dislikes(&self, target: VoteTarget) -> Result<u64, DomainError> {
        Ok(self.votes.count(target, VoteValue::Dislike).await?)
    }

    pub async fn counts(&self, target: VoteTarget) -> Result<VoteCounts, DomainError> {
        Ok(VoteCounts {
            likes: self.count_likes(target).await?,
            dislikes: self.count_dislikes(target).await?,
        })
    }

    async fn overwrite(&self, existing: Vote, value: VoteValue) -> Result<Vote, DomainError> {
        self.votes.update_value(existing.id, value).await?;
        tracing::debug!(vote_id = existing.id, value = value.as_i32(), "Vote updated");
        Ok(Vote { value, ..existing })
    }

    async fn check_target(&self, voter: UserId, target: VoteTarget) -> Result<(), DomainError> {
        let Some(user) = self.users.find_by_id(voter).await? else {
            return Err(DomainError::Forbidden);
        };

        // A comment is only as visible as the post it sits under
        let post_id = match target {
            VoteTarget::Post(post_id) => post_id,
            VoteTarget::Comment(comment_id) => match self.comments.find_by_id(comment_id).await? {
                Some(comment) => comment.post_id,
                None => return Err(DomainError::not_found("comment", comment_id)),
            },
        };

        match self.posts.find_by_id(post_id).await? {
            Some(post) if post.is_visible_to(Some((user.id, user.role))) => Ok(()),
            _ => Err(DomainError::not_found("post", post_id)),
        }
    }
}
