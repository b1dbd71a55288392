/// HTTP handlers for condovoice-service
///
/// Handlers stay thin: extract, call a service built from `AppState`, shape
/// the response. Everything under `/api/v1` except auth and health runs
/// behind `JwtAuthMiddleware`, so `UserId` is always present there.
pub mod auth;
pub mod directory;
pub mod health;
pub mod polls;
pub mod posts;
pub mod profile;

pub use auth::{login, logout, refresh, register};
pub use directory::{get_resident, list_residents};
pub use health::{health_summary, liveness_check, readiness_check};
pub use polls::{close_poll, poll_stats, vote};
pub use posts::{
    add_comment, create_post, delete_post, get_feed, get_post, list_comments, toggle_like,
};
pub use profile::{get_profile, update_profile, upload_avatar};

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::Resident;
use crate::AppState;

/// Load the caller's account; a token for a deleted resident is treated as unauthenticated
pub(crate) async fn current_resident(state: &AppState, user_id: UserId) -> Result<Resident> {
    state
        .residents
        .find_by_id(user_id.0)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Resident no longer exists".into()))
}
