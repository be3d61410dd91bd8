use std::net::TcpListener;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use memory_match_backend::run;
use memory_match_backend::config::settings::{get_config, get_jwt_settings};
use memory_match_backend::db::{PgAccountRepository, PgScoreRepository};
use memory_match_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "memory-match-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber);

    let jwt_settings = get_jwt_settings(&config);

    // An unreachable database at boot is fatal
    let connection_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database.connection_string().expose_secret())
        .await
    {
        Ok(pool) => {
            tracing::info!("Connected to Postgres");
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to Postgres: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        tracing::error!("Failed to migrate the database: {}", e);
        std::process::exit(1);
    }

    let address = config.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(
        listener,
        PgScoreRepository::new(connection_pool.clone()),
        PgAccountRepository::new(connection_pool),
        jwt_settings,
        config.application.allowed_origins.clone(),
    )?.await
}
