/// Post handlers - feed, posts, likes and comments
use super::current_resident;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::PostCategory;
use crate::services::NewPost;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<PostCategory>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// Newest posts first, optionally filtered by category
pub async fn get_feed(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let limit = state.feed.page_size(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    let posts = state
        .posts()
        .feed(user_id.0, query.category, limit, offset)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "posts": posts,
        "limit": limit,
        "offset": offset,
    })))
}

pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let author = current_resident(&state, user_id).await?;
    let post = state.posts().create_post(&author, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn get_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.posts().get_post(user_id.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.posts().delete_post(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn toggle_like(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let like = state.posts().toggle_like(user_id.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(like))
}

pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = state.posts().list_comments(*post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let author = current_resident(&state, user_id).await?;
    let comment = state
        .posts()
        .add_comment(&author, *post_id, &req.content)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
