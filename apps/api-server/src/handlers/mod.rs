//! HTTP handlers and route configuration.

mod health;
mod images;
mod pages;
mod sessions;
mod site;
mod users;


use std::sync::Arc;

use actix_web::web;

use quill_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. Login attempts go through
/// `login_limiter` when one is given.
pub fn configure_routes(cfg: &mut web::ServiceConfig, login_limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/sessions")
                    .wrap(RateLimitMiddleware::new(login_limiter))
                    .route(web::post().to(sessions::login)),
            )
            .service(
                web::resource("/sessions/current")
                    .route(web::get().to(sessions::current))
                    .route(web::delete().to(sessions::logout)),
            )
            .route("/users", web::get().to(users::list_users))
            .service(
                web::scope("/pages")
                    .route("", web::get().to(pages::list_pages))
                    .route("", web::post().to(pages::create_page))
                    .route("/published", web::get().to(pages::list_published))
                    .route("/{id}", web::get().to(pages::get_page))
                    .route("/{id}", web::put().to(pages::update_page))
                    .route("/{id}", web::delete().to(pages::delete_page)),
            )
            .route("/images", web::get().to(images::list_images))
            .service(
                web::resource("/title")
                    .route(web::get().to(site::get_title))
                    .route(web::put().to(site::update_title)),
            ),
    );
}
