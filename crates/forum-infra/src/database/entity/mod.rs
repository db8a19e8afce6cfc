//! SeaORM entities, one per table.

pub mod comment;
pub mod like;
pub mod notification;
pub mod post;
pub mod session;
pub mod user;

use forum_core::error::RepoError;

/// Column values the domain can't represent (unknown role or status, a
/// vote row pointing at neither or both targets).
pub(crate) fn corrupt_row(table: &str, detail: impl std::fmt::Display) -> RepoError {
    RepoError::Query(format!("corrupt {table} row: {detail}"))
}
