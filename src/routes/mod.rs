use actix_web::web;

use crate::db::{AccountRepository, ScoreRepository};
use crate::handlers::{auth_handler, backend_health_handler, catalog_handler, score_handler};

/// Registers every endpoint. `S` and `A` are the repositories the handlers
/// pull out of app data.
pub fn init_routes<S, A>(cfg: &mut web::ServiceConfig)
where
    S: ScoreRepository,
    A: AccountRepository,
{
    cfg.route("/health", web::get().to(backend_health_handler::backend_health_check));

    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth_handler::register_user::<A>))
            .route("/login", web::post().to(auth_handler::login_user::<A>))
            .route("/me", web::get().to(auth_handler::me::<A>)),
    );

    // Score submission and the own-scores view authenticate through the
    // `AuthenticatedUser` extractor
    cfg.service(
        web::resource("/scores")
            .route(web::get().to(score_handler::list_scores::<S>))
            .route(web::post().to(score_handler::submit_score::<S>)),
    )
    .route("/scores/me", web::get().to(score_handler::list_my_scores::<S>))
    .route("/stats", web::get().to(score_handler::get_stats::<S>))
    .route("/categories", web::get().to(catalog_handler::list_categories))
    .route("/difficulties", web::get().to(catalog_handler::list_difficulties));
}
