/// Persistence for residents and posts
///
/// Handlers only see the `ResidentStore` and `PostStore` traits. The service
/// ships a PostgreSQL implementation for deployments and an in-memory one for
/// local runs and tests.
pub mod memory;
pub mod post_repo;
pub mod resident_repo;

use crate::error::Result;
use crate::models::{Comment, LikeState, Poll, Post, PostCategory, Resident};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use post_repo::PgPostStore;
pub use resident_repo::PgResidentStore;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect using `DB_*` pool settings and run pending migrations
pub async fn init_pool(database_url: &str) -> std::result::Result<PgPool, sqlx::Error> {
    let cfg = DbPoolConfig::with_url("condovoice-service", database_url);
    cfg.log_config();
    let pool = create_pg_pool(cfg).await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

/// What happened to a vote request
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// Tally incremented; carries the updated poll
    Recorded(Poll),
    /// The resident already voted; nothing changed
    AlreadyVoted(Poll),
    PostNotFound,
    NoPoll,
    PollClosed,
    OptionOutOfRange,
}

#[async_trait::async_trait]
pub trait ResidentStore: Send + Sync {
    /// Insert a new resident. Fails with `Conflict` when the email is taken.
    async fn insert_resident(&self, resident: &Resident) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resident>>;

    /// Lookup by already-normalized (lower-cased) email
    async fn find_by_email(&self, email: &str) -> Result<Option<Resident>>;

    async fn list_residents(&self) -> Result<Vec<Resident>>;

    /// Overwrite the editable profile fields. Returns false if the resident is gone.
    async fn update_resident(&self, resident: &Resident) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &Post) -> Result<()>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// Newest first
    async fn list_posts(
        &self,
        category: Option<PostCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>>;

    /// Returns false if nothing was deleted
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Add or remove `user_id` from the post's likes in one update.
    /// `None` when the post does not exist.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeState>>;

    /// Append a comment to the post. Returns false if the post does not exist.
    async fn append_comment(&self, post_id: Uuid, comment: &Comment) -> Result<bool>;

    /// Record a vote and bump the chosen option together. A second vote by the
    /// same resident leaves every tally untouched.
    async fn record_vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        option_index: usize,
    ) -> Result<VoteOutcome>;

    /// Which of `post_ids` the resident has voted on
    async fn voted_posts(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>>;

    /// Mark the poll inactive. Returns the poll, or `None` if the post has none.
    async fn close_poll(&self, post_id: Uuid) -> Result<Option<Poll>>;

    /// Every post that carries a poll, newest first
    async fn list_poll_posts(&self) -> Result<Vec<Post>>;

    async fn ping(&self) -> Result<()>;
}

/// Reason a vote cannot be applied to `poll`, if any
pub(crate) fn check_vote(poll: Option<&Poll>, option_index: usize) -> Option<VoteOutcome> {
    match poll {
        None => Some(VoteOutcome::NoPoll),
        Some(poll) if !poll.active => Some(VoteOutcome::PollClosed),
        Some(poll) if option_index >= poll.options.len() => Some(VoteOutcome::OptionOutOfRange),
        Some(_) => None,
    }
}
