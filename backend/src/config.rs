//! Process configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

/// Seed credentials for the single operator-provisioned admin account.
///
/// Admin accounts cannot be created through the open registration endpoint;
/// the only way to get one is to set `ADMIN_USERNAME` / `ADMIN_EMAIL` /
/// `ADMIN_PASSWORD` before the first start.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Lifetime of a bearer session token, in hours.
    pub session_ttl_hours: i64,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        let host = env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BIND_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("interntrack.sqlite"));
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 7);

        let admin_seed = match (
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            _ => None,
        };

        AppConfig {
            host,
            port,
            database_path,
            session_ttl_hours,
            admin_seed,
        }
    }
}
