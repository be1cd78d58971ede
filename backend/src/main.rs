mod config;
mod error;
mod render;
mod services;
mod state;
mod storage;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::state::AppState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use log::info;

/// JSON 404 for every path no service claims.
async fn unknown_route(req: HttpRequest) -> Result<HttpResponse> {
    Err(Error::not_found(format!("Route {} {}", req.method(), req.path())))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let (host, port) = config.bind_address();
    let json_limit = config.server.max_upload_bytes;
    let state = AppState::initialize(config).map_err(|e| std::io::Error::other(e.to_string()))?;

    info!(
        "Database at {}, templates in {}, certificates in {}",
        state.db.path().display(),
        state.templates_dir().display(),
        state.certificates_dir().display()
    );
    info!("Server running at http://{host}:{port}");

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(state.clone())
            .service(services::participants::configure_routes())
            .service(services::templates::configure_routes())
            .service(services::generate::configure_routes())
            .service(services::certificates::configure_routes())
            .service(services::downloads::configure_routes())
            .default_service(web::route().to(unknown_route))
    })
    .bind((host, port))?
    .run()
    .await
}
