#![warn(clippy::all, clippy::pedantic)]

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use dotenvy::dotenv;
use sitewatch_service::{Config, HttpChecker, LibsqlStatusStore, MonitoringScheduler, StatusStore};
use tokio::sync::watch;
use tracing::{error, info};

mod error;
mod routes;

use error::AppError;

/// Probe one site on a fixed cadence and serve the recorded history.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML config file (defaults to ~/.config/sitewatch/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    logger::init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?.with_env_overrides()?;
    config.validate()?;
    info!("{config}");

    let store: Arc<dyn StatusStore> =
        match LibsqlStatusStore::initialize(&config.database.path).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Failed to initialize database: {e}");
                return Err(e.into());
            }
        };

    let checker = Arc::new(HttpChecker::new(&config.probe)?);
    let scheduler = MonitoringScheduler::new(
        checker,
        store.clone(),
        config.probe.target_url.clone(),
        Duration::from_secs(config.probe.interval_seconds),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = scheduler.spawn(shutdown_rx);

    let addr = listen_addr(&config.server.bind, config.server.port)?;
    let served = run_server(addr, store).await;

    // The server has drained; let an in-flight check finish, then stop.
    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor.await {
        error!("Monitor task ended abnormally: {e}");
    }

    served
}

/// Accepts bare IPv4 and IPv6 addresses (`0.0.0.0`, `::`)
fn listen_addr(bind: &str, port: u16) -> Result<SocketAddr, AppError> {
    let ip: IpAddr = bind.trim().parse()?;
    Ok(SocketAddr::new(ip, port))
}

async fn run_server(addr: SocketAddr, store: Arc<dyn StatusStore>) -> Result<(), AppError> {
    let store = web::Data::from(store);

    info!("Starting HTTP server on {addr}");
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
