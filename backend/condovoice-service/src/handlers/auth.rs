/// Account handlers - registration, login and token refresh
use crate::error::Result;
use crate::services::{Credentials, Registration};
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<Registration>,
) -> Result<HttpResponse> {
    let response = state.auth().register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<Credentials>,
) -> Result<HttpResponse> {
    let response = state.auth().login(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn refresh(
    state: web::Data<AppState>,
    req: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let tokens = state.auth().refresh(&req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Tokens are stateless; clients drop them on logout
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "logged_out": true }))
}
