/// Own-profile handlers
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::ProfileChanges;
use crate::AppState;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use futures::StreamExt;

pub async fn get_profile(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let resident = state.profiles().get(user_id.0).await?;
    Ok(HttpResponse::Ok().json(resident))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<ProfileChanges>,
) -> Result<HttpResponse> {
    let resident = state.profiles().update(user_id.0, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resident))
}

/// `image/png; charset=...` -> `image/png`
fn image_content_type(req: &HttpRequest) -> Result<String> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("image/") && content_type.len() > "image/".len() {
        Ok(content_type)
    } else {
        Err(AppError::Validation(
            "Avatar upload must have an image/* content type".into(),
        ))
    }
}

/// Raw image body; rejected as soon as it grows past the configured limit
pub async fn upload_avatar(
    state: web::Data<AppState>,
    user_id: UserId,
    req: HttpRequest,
    mut payload: web::Payload,
) -> Result<HttpResponse> {
    if state.avatars.is_none() {
        return Err(AppError::Unavailable(
            "Avatar storage is not configured".into(),
        ));
    }
    let content_type = image_content_type(&req)?;
    let max_bytes = state.avatar_max_bytes;

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
        if body.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Avatar must be at most {} bytes",
                max_bytes
            )));
        }
        body.extend_from_slice(&chunk);
    }
    if body.is_empty() {
        return Err(AppError::Validation("Avatar upload is empty".into()));
    }

    let resident = state
        .profiles()
        .upload_avatar(user_id.0, body.to_vec(), &content_type)
        .await?;
    Ok(HttpResponse::Ok().json(resident))
}
