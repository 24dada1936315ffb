mod auth;
mod config;
mod db;
mod error;
mod services;
mod validation;

use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::Utc;
use env_logger::Env;
use log::info;
use rusqlite::{params, OptionalExtension};

use crate::config::{AdminSeed, AppConfig};
use crate::db::{ts, Db};
use crate::error::ApiError;

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "message": "Route not found" }))
}

/// Inserts the operator-provisioned admin account unless one with the seed
/// email already exists.
fn seed_admin(db: &Db, seed: &AdminSeed) -> Result<(), ApiError> {
    let conn = db.open()?;
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![validation::normalize_email(&seed.email)],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Ok(());
    }

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, role, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, 'admin', 1, ?5)",
        params![
            uuid::Uuid::new_v4().to_string(),
            seed.username.trim(),
            validation::normalize_email(&seed.email),
            auth::hash_password(&seed.password)?,
            ts(Utc::now())
        ],
    )?;
    info!("Seeded admin account {}", seed.username);
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    let db = Db::new(config.database_path.clone());
    db.init()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    if let Some(seed) = &config.admin_seed {
        seed_admin(&db, seed).map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    info!("Server running at http://{}:{}", config.host, config.port);

    let bind = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(services::auth::configure_routes())
            .service(services::internships::configure_routes())
            .service(services::students::configure_routes())
            .service(services::applications::configure_routes())
            .service(services::recruiters::configure_routes())
            .service(services::admin::configure_routes())
            .default_service(web::route().to(not_found))
    })
    .bind(bind)?
    .run()
    .await
}
