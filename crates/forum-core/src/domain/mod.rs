//! Domain entities - the core business objects.

mod comment;
mod notification;
mod post;
mod session;
mod user;
mod vote;

pub use comment::{Comment, CommentId, NewComment};
pub use notification::{NewNotification, Notification, NotificationId};
pub use post::{ModerationStatus, NewPost, Post, PostEdit, PostId, PostRevision};
pub use session::{DEFAULT_SESSION_TTL_HOURS, IdentitySource, Session};
pub use user::{
    DEFAULT_PHOTO, EXTERNAL_CREDENTIAL, NewUser, Role, User, UserId, UserStats, mask_email,
};
pub use vote::{Vote, VoteCounts, VoteId, VoteTarget, VoteValue};
