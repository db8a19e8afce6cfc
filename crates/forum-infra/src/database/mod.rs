//! Store adapters: in-memory and PostgreSQL.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnections};
#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCommentRepository, PostgresNotificationRepository, PostgresPostRepository,
    PostgresSessionRepository, PostgresStore, PostgresUserRepository, PostgresVoteRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
