mod config;
mod errors;
mod ids;
mod models;
mod openapi;
mod routes;
mod services;
mod store;
mod users;
mod wishes;

use config::Config;
use dotenvy::dotenv;
use errors::CustomError;
use log::info;
use ntex::web::{self, middleware, App, HttpServer};
use std::{sync::Arc, time::Instant};
use store::{MemoryStore, PgStore, WishStore};

pub struct AppState {
    pub store: Arc<dyn WishStore>,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn WishStore>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store,
            config,
            started_at: Instant::now(),
        })
    }
}

#[ntex::main]
async fn main() -> Result<(), CustomError> {
    dotenv().ok();

    // log
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    // 雪花id
    ids::init(config.id_worker_id)?;

    let store: Arc<dyn WishStore> = match &config.database_url {
        Some(db_url) => {
            info!("using postgres wish store");
            Arc::new(PgStore::connect(db_url, config.db_max_connections).await?)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory demo store");
            Arc::new(MemoryStore::seeded())
        }
    };

    let addr = (config.host.clone(), config.port);
    let workers = config.workers;
    info!("server running on {}:{} ({})", addr.0, addr.1, config.app_env);
    info!("health check: http://localhost:{}/health", addr.1);

    // state
    let app_state = AppState::new(store, config);

    HttpServer::new(move || {
        App::new()
            .state(Arc::clone(&app_state))
            .wrap(middleware::Logger::default())
            .configure(routes::route)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(workers)
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
