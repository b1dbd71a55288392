/// CondoVoice Service Library
///
/// Backend for a condominium community app: resident accounts, the social
/// feed with likes, comments and embedded polls, the resident directory and
/// profile management.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `routes`: route table shared by the binary and the integration tests
/// - `services`: business logic and display shaping
/// - `db`: store traits with PostgreSQL and in-memory implementations
/// - `storage`: avatar image storage
/// - `middleware`: JWT authentication and request metrics
/// - `error`: error type and HTTP mapping
/// - `config`: configuration from the environment
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};

use config::{FeedConfig, DEFAULT_AVATAR_MAX_BYTES};
use db::{MemoryStore, PostStore, ResidentStore};
use services::{AuthService, DirectoryService, PollService, PostService, ProfileService};
use std::sync::Arc;
use storage::AvatarStorage;

/// Shared handler state, registered once as `web::Data<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub residents: Arc<dyn ResidentStore>,
    pub posts: Arc<dyn PostStore>,
    pub avatars: Option<Arc<dyn AvatarStorage>>,
    pub feed: FeedConfig,
    pub avatar_max_bytes: usize,
}

impl AppState {
    pub fn new(residents: Arc<dyn ResidentStore>, posts: Arc<dyn PostStore>) -> Self {
        Self {
            residents,
            posts,
            avatars: None,
            feed: FeedConfig::default(),
            avatar_max_bytes: DEFAULT_AVATAR_MAX_BYTES,
        }
    }

    /// Both stores backed by one in-memory instance
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store)
    }

    pub fn with_avatars(mut self, avatars: Arc<dyn AvatarStorage>) -> Self {
        self.avatars = Some(avatars);
        self
    }

    pub fn with_feed(mut self, feed: FeedConfig) -> Self {
        self.feed = feed;
        self
    }

    pub fn with_avatar_max_bytes(mut self, max_bytes: usize) -> Self {
        self.avatar_max_bytes = max_bytes;
        self
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.residents.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.posts.clone())
    }

    pub fn polls(&self) -> PollService {
        PollService::new(self.posts.clone())
    }

    pub fn directory(&self) -> DirectoryService {
        DirectoryService::new(self.residents.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.residents.clone(), self.avatars.clone())
    }
}
