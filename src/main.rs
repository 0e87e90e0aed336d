use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use taskvault::config::Config;
use taskvault::routes::{self, health};
use taskvault::state::AppState;
use taskvault::store::{MemoryStore, PgStore, Store};

fn to_io_error(e: taskvault::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await.map_err(to_io_error)?),
        None => {
            log::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = web::Data::new(AppState::from_config(&config, store));
    // Pay for the dummy hash now rather than on the first failed login.
    state.dummy_hash().await.map_err(to_io_error)?;

    log::info!(
        "Starting TaskVault server at {} (token ttl {} minutes)",
        config.server_url(),
        config.token_ttl_minutes
    );
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
