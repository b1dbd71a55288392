/// Route table for condovoice-service
///
/// Health, metrics and auth are public. Everything else under `/api/v1`
/// sits behind `JwtAuthMiddleware`. Extractor failures (bad JSON, query or
/// path) come back as the same JSON error body as handler errors.
use crate::error::AppError;
use crate::handlers;
use crate::metrics;
use crate::middleware::JwtAuthMiddleware;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .route("/metrics", web::get().to(metrics::serve_metrics))
    .route("/api/v1/health", web::get().to(handlers::health_summary))
    .route("/api/v1/health/live", web::get().to(handlers::liveness_check))
    .route("/api/v1/health/ready", web::get().to(handlers::readiness_check))
    .service(
        web::scope("/api/v1/auth")
            .route("/register", web::post().to(handlers::register))
            .route("/login", web::post().to(handlers::login))
            .route("/refresh", web::post().to(handlers::refresh))
            .route("/logout", web::post().to(handlers::logout)),
    )
    .service(
        web::scope("/api/v1")
            .wrap(JwtAuthMiddleware)
            .route("/feed", web::get().to(handlers::get_feed))
            .service(
                web::scope("/posts")
                    .service(web::resource("").route(web::post().to(handlers::create_post)))
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(handlers::get_post))
                            .route(web::delete().to(handlers::delete_post)),
                    )
                    .route("/{post_id}/like", web::post().to(handlers::toggle_like))
                    .service(
                        web::resource("/{post_id}/comments")
                            .route(web::get().to(handlers::list_comments))
                            .route(web::post().to(handlers::add_comment)),
                    )
                    .route("/{post_id}/poll/vote", web::post().to(handlers::vote))
                    .route("/{post_id}/poll/close", web::post().to(handlers::close_poll)),
            )
            .route("/polls/stats", web::get().to(handlers::poll_stats))
            .route("/residents", web::get().to(handlers::list_residents))
            .route("/residents/{resident_id}", web::get().to(handlers::get_resident))
            .service(
                web::resource("/profile")
                    .route(web::get().to(handlers::get_profile))
                    .route(web::patch().to(handlers::update_profile)),
            )
            .route("/profile/avatar", web::put().to(handlers::upload_avatar)),
    );
}
