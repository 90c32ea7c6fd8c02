//! LMS Backend
//!
//! Layered architecture:
//! - domain: Core entities, business rules and the ordering resolver
//! - repository: Data access abstractions and SQLite implementations
//! - commands: HTTP command handlers

use anyhow::Context;
use std::sync::Arc;

pub mod domain;
pub mod repository;
pub mod commands;
pub mod config;

use config::ServerConfig;
use repository::{
    init_db, BatchRepository, BlogRepository, CourseRepository, DbState, EnrollmentRepository,
    InstructorRepository, PaymentRepository, SectionRepository, SessionRepository,
};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub course_repo: CourseRepository,
    pub batch_repo: BatchRepository,
    pub section_repo: SectionRepository,
    pub session_repo: SessionRepository,
    pub enrollment_repo: EnrollmentRepository,
    pub payment_repo: PaymentRepository,
    pub instructor_repo: InstructorRepository,
    pub blog_repo: BlogRepository,
}

impl AppState {
    pub fn new(db_state: DbState) -> Self {
        let conn = db_state.conn.clone();
        Self {
            course_repo: CourseRepository::new(conn.clone()),
            batch_repo: BatchRepository::new(conn.clone()),
            section_repo: SectionRepository::new(conn.clone()),
            session_repo: SessionRepository::new(conn.clone()),
            enrollment_repo: EnrollmentRepository::new(conn.clone()),
            payment_repo: PaymentRepository::new(conn.clone()),
            instructor_repo: InstructorRepository::new(conn.clone()),
            blog_repo: BlogRepository::new(conn),
            db_state,
        }
    }
}

/// Start logging, open the database and serve until Ctrl-C
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let _log_guard = rolling_logger::init_logger(config.log_path()?, "LmsBackend")
        .map_err(|e| anyhow::anyhow!("failed to init rolling logger: {}", e))?;

    let db_path = config.db_path()?;
    let db_state = match init_db(&db_path).await {
        Ok(state) => state,
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e).with_context(|| format!("failed to open database {}", db_path.display()));
        }
    };

    let state = Arc::new(AppState::new(db_state.clone()));
    let app = commands::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    log::info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db_state.close().await;
    let _ = rolling_logger::info("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
