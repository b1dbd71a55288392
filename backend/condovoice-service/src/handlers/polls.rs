/// Poll handlers - voting, closing and the statistics page
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_index: i64,
}

/// Vote on a post's poll. A repeat vote answers 200 with `recorded: false`.
pub async fn vote(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<VoteRequest>,
) -> Result<HttpResponse> {
    let option_index = usize::try_from(req.option_index).map_err(|_| {
        AppError::Validation(format!("Option {} does not exist", req.option_index))
    })?;

    let result = state
        .polls()
        .vote(*post_id, user_id.0, option_index)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn close_poll(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let poll = state.polls().close(*post_id, user_id.0).await?;
    Ok(HttpResponse::Ok().json(poll))
}

pub async fn poll_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let stats = state.polls().stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
