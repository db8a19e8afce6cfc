//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod moderation;
mod posts;
mod users;
mod views;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            // Content
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/recent", web::get().to(posts::recent))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::edit))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/report", web::post().to(posts::report))
                    .route("/{id}/vote", web::post().to(posts::vote))
                    .route("/{id}/comments", web::get().to(posts::comments))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/comments")
                    .route("/{id}", web::delete().to(comments::delete))
                    .route("/{id}/vote", web::post().to(comments::vote)),
            )
            // Staff
            .service(
                web::scope("/moderation")
                    .route("/pending", web::get().to(moderation::pending))
                    .route("/posts/{id}/approve", web::post().to(moderation::approve))
                    .route("/posts/{id}/reject", web::post().to(moderation::reject))
                    .route("/comments/{id}", web::delete().to(moderation::delete_comment)),
            )
            .service(
                web::scope("/users")
                    .route("/me", web::put().to(users::update_profile))
                    .route("/{id}", web::get().to(users::profile))
                    .route("/{id}/stats", web::get().to(users::stats))
                    .route("/{id}/notifications", web::get().to(users::notifications))
                    .route(
                        "/{id}/notifications",
                        web::delete().to(users::clear_notifications),
                    ),
            )
            .service(
                web::scope("/admin")
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}/promote", web::post().to(admin::promote))
                    .route("/users/{id}/demote", web::post().to(admin::demote)),
            ),
    );
}
