/// Resident directory handlers
use crate::error::Result;
use crate::services::DirectorySort;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: DirectorySort,
}

pub async fn list_residents(
    state: web::Data<AppState>,
    query: web::Query<DirectoryQuery>,
) -> Result<HttpResponse> {
    let entries = state.directory().list(&query.q, query.sort).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "residents": entries,
        "total": entries.len(),
    })))
}

pub async fn get_resident(
    state: web::Data<AppState>,
    resident_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let entry = state.directory().get(*resident_id).await?;
    Ok(HttpResponse::Ok().json(entry))
}
