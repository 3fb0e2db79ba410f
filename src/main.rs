use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use pawpal::ads;
use pawpal::api::active::ActiveRequests;
use pawpal::api::middleware::ApiKeyAuth;
use pawpal::advice::ProviderFactory;
use pawpal::cli::{commands::{Cli, Commands}, run_cli};
use pawpal::config::AppConfig;
use pawpal::db;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

async fn index() -> impl Responder {
    let html = include_str!("../static/index.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting PawPal Advice Server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("Failed to initialize advice provider from config.yaml mapping");
            std::process::exit(1);
        }
    };

    let catalog = match ads::load_catalog() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to parse ad catalog: {}", e);
            std::process::exit(1);
        }
    };

    let active = ActiveRequests::new();

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(provider.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(web::Data::new(active.clone()))
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .wrap(ApiKeyAuth)
            .configure(pawpal::api::routes::configure)
            .configure(pawpal::api::websocket::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
