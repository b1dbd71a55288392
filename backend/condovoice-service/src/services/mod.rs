/// Business logic behind the HTTP handlers
///
/// Services are cheap to build per request from the shared stores. Pure
/// shaping and validation helpers live next to the service that uses them.
pub mod auth;
pub mod directory;
pub mod polls;
pub mod posts;
pub mod profile;

pub use auth::{AuthResponse, AuthService, Credentials, Registration};
pub use directory::{DirectoryService, DirectorySort};
pub use polls::{PollDraft, PollService, VoteResult};
pub use posts::{LikeResponse, NewPost, PostService};
pub use profile::{ProfileChanges, ProfileService};

/// Trim an optional text field; blank values become `None`
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
