use actix_web::{http, web, App, HttpServer};
use actix_web::dev::Server;
use tracing_actix_web::TracingLogger;
use std::net::TcpListener;
use actix_cors::Cors;

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod game;
mod handlers;
pub mod models;
mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use crate::config::jwt::JwtSettings;
use crate::db::{AccountRepository, ScoreRepository};
use crate::errors::AppError;
use crate::routes::init_routes;

pub fn run<S, A>(
    listener: TcpListener,
    score_repository: S,
    account_repository: A,
    jwt_settings: JwtSettings,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error>
where
    S: ScoreRepository,
    A: AccountRepository,
{
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let score_repository = web::Data::new(score_repository);
    let account_repository = web::Data::new(account_repository);
    let jwt_settings = web::Data::new(jwt_settings);

    let server = HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        // Malformed bodies and query strings get the uniform error shape
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid request body: {}", err)).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid query string: {}", err)).into()
        });

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(json_config)
            .app_data(query_config)
            .app_data(score_repository.clone())
            .app_data(account_repository.clone())
            .app_data(jwt_settings.clone())
            .configure(init_routes::<S, A>)
            .default_service(web::to(handlers::backend_health_handler::not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
