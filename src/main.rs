// main.rs
use actix_cors::Cors;
use actix_files::Files;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod error;
mod models;
mod repository;
mod state;
mod storage;
mod validation;

use crate::{
    config::Config, repository::MySqlSiswaRepository, state::AppState, storage::LocalBlobStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Konfigurasi tidak valid: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match db::establish_connection(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Gagal inisialisasi pool database: {:?}", e);
            std::process::exit(1);
        }
    };

    let blobs = Arc::new(LocalBlobStore::new(config.upload_dir.clone()));
    tokio::fs::create_dir_all(blobs.root()).await?;
    let state = AppState::new(Arc::new(MySqlSiswaRepository::new(pool)), blobs.clone());

    let cors_origin = config.cors_origin.clone();
    let upload_root = blobs.root().to_path_buf();

    log::info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .service(Files::new("/uploads", upload_root.clone()))
            .service(controllers::siswa_controller::scope())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
