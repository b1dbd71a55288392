//! Shared setup for HTTP-level tests
//!
//! The app runs against the in-memory store and in-memory avatar storage, with
//! the same route table the binary uses.
#![allow(dead_code)]

use actix_web::http::header;
use condovoice_service::storage::MemoryAvatarStorage;
use condovoice_service::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

pub const AVATAR_LIMIT: usize = 1024;
pub const PASSWORD: &str = "secret123";

pub fn test_state() -> (AppState, Arc<MemoryAvatarStorage>) {
    crypto_core::testing::init_test_keys();
    let avatars = Arc::new(MemoryAvatarStorage::new("http://media.condo.test"));
    let state = AppState::in_memory()
        .with_avatars(avatars.clone())
        .with_avatar_max_bytes(AVATAR_LIMIT);
    (state, avatars)
}

pub fn registration(email: &str, name: &str, apt: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "name": name,
        "apt_number": apt,
    })
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// A registered resident: id and access token
pub struct Account {
    pub id: String,
    pub token: String,
    pub refresh_token: String,
}

impl Account {
    pub fn from_body(body: &Value) -> Self {
        Self {
            id: body["resident"]["id"].as_str().unwrap().to_string(),
            token: body["tokens"]["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["tokens"]["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}

#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(condovoice_service::middleware::MetricsMiddleware)
                .configure(condovoice_service::routes::configure),
        )
        .await
    };
}

/// Register through the API and return the new `Account`
#[macro_export]
macro_rules! register {
    ($app:expr, $email:expr, $name:expr, $apt:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json($crate::common::registration($email, $name, $apt))
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        $crate::common::Account::from_body(&body)
    }};
}
