//! End-to-end HTTP tests against the in-memory store.
//!
//!   cargo test -p condovoice-service --test api_flow

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use common::{bearer, registration, test_state, AVATAR_LIMIT, PASSWORD};
use condovoice_service::AppState;
use serde_json::{json, Value};

// ============================================================================
// Auth
// ============================================================================

#[actix_web::test]
async fn register_login_and_duplicate_email() {
    let (state, _) = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(registration("Ana@Condo.test", "Ana Lima", "12B"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["resident"]["email"], "ana@condo.test");
    assert!(body["resident"].get("password_hash").is_none());
    assert_eq!(body["tokens"]["token_type"], "Bearer");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(registration("ana@condo.test", "Someone Else", "1A"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 409);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "email": "bruno@condo.test", "password": "12345" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ana@condo.test", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": " ANA@condo.test ", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["resident"]["name"], "Ana Lima");
}

#[actix_web::test]
async fn protected_routes_require_access_token() {
    let (state, _) = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/feed").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/residents")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let account = register!(app, "ana@condo.test", "Ana", "12B");
    let req = test::TestRequest::get()
        .uri("/api/v1/profile")
        .insert_header(bearer(&account.refresh_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/v1/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/health/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ready"], true);
}

#[actix_web::test]
async fn refresh_accepts_only_refresh_tokens() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let account = register!(app, "ana@condo.test", "Ana", "12B");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": account.token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": account.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["access_token"].as_str().is_some());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Feed, likes, comments
// ============================================================================

#[actix_web::test]
async fn post_like_and_comment_flow() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana Lima", "12B");
    let bruno = register!(app, "bruno@condo.test", "Bruno", "3C");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({
            "content": "  Water will be off on Tuesday  ",
            "category": "maintenance",
            "urgency": "important",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["content"], "Water will be off on Tuesday");
    assert_eq!(post["author"]["name"], "Ana Lima");
    assert_eq!(post["like_count"], 0);

    let like_uri = format!("/api/v1/posts/{}/like", post_id);
    let req = test::TestRequest::post()
        .uri(&like_uri)
        .insert_header(bearer(&bruno.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["liked"], true);
    assert_eq!(body["like_count"], 1);

    let req = test::TestRequest::post()
        .uri(&like_uri)
        .insert_header(bearer(&bruno.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["liked"], false);
    assert_eq!(body["like_count"], 0);

    let comments_uri = format!("/api/v1/posts/{}/comments", post_id);
    let req = test::TestRequest::post()
        .uri(&comments_uri)
        .insert_header(bearer(&bruno.token))
        .set_json(json!({ "content": "Thanks for the heads up" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&comments_uri)
        .insert_header(bearer(&bruno.token))
        .set_json(json!({ "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&comments_uri)
        .insert_header(bearer(&ana.token))
        .to_request();
    let comments: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["author"]["name"], "Bruno");

    let req = test::TestRequest::get()
        .uri("/api/v1/feed")
        .insert_header(bearer(&ana.token))
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["comment_count"], 1);
    assert_eq!(posts[0]["urgency"], "important");
}

#[actix_web::test]
async fn feed_pages_and_filters_by_category() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    for (content, category) in [
        ("Lost keys near the gym", "general"),
        ("Selling a bike", "marketplace"),
        ("Elevator inspection", "maintenance"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(&ana.token))
            .set_json(json!({ "content": content, "category": category }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/feed?limit=2")
        .insert_header(bearer(&ana.token))
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed["posts"].as_array().unwrap().len(), 2);
    assert_eq!(feed["limit"], 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/feed?limit=2&offset=2")
        .insert_header(bearer(&ana.token))
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed["posts"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/feed?category=marketplace")
        .insert_header(bearer(&ana.token))
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], "Selling a bike");

    let req = test::TestRequest::get()
        .uri("/api/v1/feed?category=gossip")
        .insert_header(bearer(&ana.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn post_validation_rules() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    let rejected = [
        json!({ "content": "   " }),
        json!({ "content": "Party on the roof", "category": "event" }),
        json!({
            "content": "Party on the roof",
            "category": "event",
            "event": {
                "starts_at": "2026-06-01T20:00:00Z",
                "ends_at": "2026-06-01T18:00:00Z"
            }
        }),
        json!({
            "content": "Which day?",
            "poll": { "question": "Pick one", "options": ["Monday", "   "] }
        }),
        json!({ "content": "x".repeat(2001) }),
    ];
    for body in rejected {
        let req = test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(&ana.token))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {}", body);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({
            "content": "Party on the roof",
            "category": "event",
            "event": { "starts_at": "2026-06-01T20:00:00Z", "location": " Rooftop " }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["event"]["location"], "Rooftop");

    let padded = format!("   {}   ", "x".repeat(2000));
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "content": padded }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["content"].as_str().unwrap().len(), 2000);
}

#[actix_web::test]
async fn only_author_deletes_post() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");
    let bruno = register!(app, "bruno@condo.test", "Bruno", "3C");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "content": "Garage door is fixed" }))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&post_uri)
        .insert_header(bearer(&bruno.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&post_uri)
        .insert_header(bearer(&ana.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&post_uri)
        .insert_header(bearer(&ana.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/not-a-uuid")
        .insert_header(bearer(&ana.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Polls
// ============================================================================

#[actix_web::test]
async fn poll_votes_once_per_resident() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");
    let bruno = register!(app, "bruno@condo.test", "Bruno", "3C");
    let carla = register!(app, "carla@condo.test", "Carla", "7A");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({
            "content": "",
            "poll": { "question": "Paint the lobby?", "options": ["Yes", " No ", ""] }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["poll"]["options"].as_array().unwrap().len(), 2);
    assert_eq!(post["poll"]["options"][1]["label"], "No");
    assert_eq!(post["poll"]["has_voted"], false);

    let vote_uri = format!("/api/v1/posts/{}/poll/vote", post_id);
    let req = test::TestRequest::post()
        .uri(&vote_uri)
        .insert_header(bearer(&bruno.token))
        .set_json(json!({ "option_index": 1 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["recorded"], true);
    assert_eq!(body["poll"]["options"][1]["votes"], 1);
    assert_eq!(body["poll"]["options"][1]["percentage"], 100.0);
    assert_eq!(body["poll"]["has_voted"], true);

    // Second vote is dropped without error and changes nothing
    let req = test::TestRequest::post()
        .uri(&vote_uri)
        .insert_header(bearer(&bruno.token))
        .set_json(json!({ "option_index": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["recorded"], false);
    assert_eq!(body["poll"]["options"][0]["votes"], 0);
    assert_eq!(body["poll"]["total_votes"], 1);

    let req = test::TestRequest::post()
        .uri(&vote_uri)
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "option_index": 0 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["poll"]["options"][0]["percentage"], 50.0);
    assert_eq!(body["poll"]["options"][1]["percentage"], 50.0);

    let req = test::TestRequest::post()
        .uri(&vote_uri)
        .insert_header(bearer(&carla.token))
        .set_json(json!({ "option_index": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let close_uri = format!("/api/v1/posts/{}/poll/close", post_id);
    let req = test::TestRequest::post()
        .uri(&close_uri)
        .insert_header(bearer(&bruno.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&close_uri)
        .insert_header(bearer(&ana.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["active"], false);
    assert_eq!(body["has_voted"], true);

    let req = test::TestRequest::post()
        .uri(&vote_uri)
        .insert_header(bearer(&carla.token))
        .set_json(json!({ "option_index": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/polls/stats")
        .insert_header(bearer(&carla.token))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["total_polls"], 1);
    assert_eq!(stats["total_votes"], 2);
    assert_eq!(stats["average_votes_per_poll"], 2);
    assert_eq!(stats["polls"][0]["question"], "Paint the lobby?");
}

#[actix_web::test]
async fn vote_on_post_without_poll_is_not_found() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "content": "Just text" }))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/poll/vote", post["id"].as_str().unwrap()))
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "option_index": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Directory and profile
// ============================================================================

#[actix_web::test]
async fn directory_search_and_sort() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana Lima", "12B");
    register!(app, "bruno@condo.test", "bruno costa", "3C");
    register!(app, "carla@condo.test", "Carla Lima", "1A");

    let req = test::TestRequest::get()
        .uri("/api/v1/residents?q=LIMA")
        .insert_header(bearer(&ana.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
    let names: Vec<&str> = body["residents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana Lima", "Carla Lima"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/residents?sort=apt")
        .insert_header(bearer(&ana.token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let apts: Vec<&str> = body["residents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["apt_number"].as_str().unwrap())
        .collect();
    assert_eq!(apts, vec!["12B", "1A", "3C"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/residents/{}", ana.id))
        .insert_header(bearer(&ana.token))
        .to_request();
    let entry: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(entry["initials"], "AL");
    assert_eq!(entry["phone"], "No phone");
    assert!(entry["whatsapp_url"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/residents/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&ana.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn profile_update_shows_in_directory() {
    let (state, _) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    let req = test::TestRequest::patch()
        .uri("/api/v1/profile")
        .insert_header(bearer(&ana.token))
        .set_json(json!({
            "name": "Ana Lima",
            "phone": "+55 (11) 98765-4321",
            "avatar": "🌻",
            "card_color": "#ffcc00",
            "residency": "owner",
            "move_in_date": "2021-03-15",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = test::read_body_json(resp).await;
    assert_eq!(profile["name"], "Ana Lima");
    assert_eq!(profile["apt_number"], "12B");
    assert_eq!(profile["residency"], "owner");
    assert_eq!(profile["move_in_date"], "2021-03-15");

    let req = test::TestRequest::patch()
        .uri("/api/v1/profile")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "move_in_date": "" }))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert!(profile["move_in_date"].is_null());
    assert_eq!(profile["name"], "Ana Lima");

    let req = test::TestRequest::patch()
        .uri("/api/v1/profile")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "move_in_date": "15/03/2021" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/v1/profile")
        .insert_header(bearer(&ana.token))
        .set_json(json!({ "avatar": "plain words" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/residents/{}", ana.id))
        .insert_header(bearer(&ana.token))
        .to_request();
    let entry: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(entry["avatar"], "🌻");
    assert_eq!(entry["avatar_kind"], "emoji");
    assert_eq!(
        entry["whatsapp_url"],
        "https://api.whatsapp.com/send?phone=5511987654321"
    );
}

#[actix_web::test]
async fn avatar_upload_stores_image_and_enforces_limits() {
    let (state, avatars) = test_state();
    let app = test_app!(state);
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/avatar")
        .insert_header(bearer(&ana.token))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = test::read_body_json(resp).await;
    let url = profile["avatar"].as_str().unwrap();
    assert!(url.starts_with(&format!("http://media.condo.test/avatars/{}?v=", ana.id)));

    let stored = avatars.get(&format!("avatars/{}", ana.id)).await.unwrap();
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.body, vec![0x89, b'P', b'N', b'G']);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/avatar")
        .insert_header(bearer(&ana.token))
        .insert_header((header::CONTENT_TYPE, "image/jpeg"))
        .set_payload(vec![0u8; AVATAR_LIMIT + 1])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/avatar")
        .insert_header(bearer(&ana.token))
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn avatar_upload_unavailable_without_storage() {
    crypto_core::testing::init_test_keys();
    let app = test_app!(AppState::in_memory());
    let ana = register!(app, "ana@condo.test", "Ana", "12B");

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/avatar")
        .insert_header(bearer(&ana.token))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![1, 2, 3])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn metrics_endpoint_reports_requests() {
    let (state, _) = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("condovoice_http_requests_total"));
}
