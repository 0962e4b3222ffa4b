//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use chrono::Duration;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::sessions::SessionStore;
use crate::presentation::http::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sessions: Arc<SessionStore>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Migrations applied");

        let sessions = Arc::new(SessionStore::new(Duration::minutes(
            settings.session.idle_timeout_minutes,
        )));

        let state = AppState {
            db,
            sessions,
            settings: Arc::new(settings.clone()),
        };

        let router = routes::create_routes(state);

        let addr = settings.server.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        crate::presentation::http::handlers::health::init_server_start();
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
