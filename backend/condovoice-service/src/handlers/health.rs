/// Liveness and readiness endpoints
use crate::error::Result;
use crate::AppState;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub status: ComponentStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: ComponentStatus,
    pub checks: HashMap<String, ComponentCheck>,
    pub timestamp: String,
}

const CHECK_FAILED: &str = "check failed";

async fn timed_check<F>(component: &str, check: F, failure: ComponentStatus) -> ComponentCheck
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();
    let result = check.await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "ok".to_string(),
            latency_ms,
        },
        Err(e) => {
            tracing::warn!(component, error = %e, "Health check failed");
            ComponentCheck {
                status: failure,
                message: CHECK_FAILED.to_string(),
                latency_ms,
            }
        }
    }
}

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.residents.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "condovoice-service",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": "Database unavailable",
                "service": "condovoice-service",
            }))
        }
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}

/// Stores must answer; avatar storage failing only degrades the service
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let mut checks = HashMap::new();

    checks.insert(
        "residents".to_string(),
        timed_check("residents", state.residents.ping(), ComponentStatus::Unhealthy).await,
    );
    checks.insert(
        "posts".to_string(),
        timed_check("posts", state.posts.ping(), ComponentStatus::Unhealthy).await,
    );
    if let Some(avatars) = &state.avatars {
        checks.insert(
            "avatar_storage".to_string(),
            timed_check("avatar_storage", avatars.health_check(), ComponentStatus::Degraded).await,
        );
    }

    let ready = !checks
        .values()
        .any(|c| c.status == ComponentStatus::Unhealthy);
    let status = if !ready {
        ComponentStatus::Unhealthy
    } else if checks.values().any(|c| c.status == ComponentStatus::Degraded) {
        ComponentStatus::Degraded
    } else {
        ComponentStatus::Healthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
