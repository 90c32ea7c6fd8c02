//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Connection shared by every repository
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    pub path: PathBuf,
}

impl DbState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            path,
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Drop the connection; later calls fail with "Database not initialized"
    pub async fn close(&self) {
        let mut guard = self.conn.lock().await;
        if guard.take().is_some() {
            log::info!("Closed database {}", self.path.display());
        }
    }
}

pub(crate) fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                DomainError::Conflict(e.to_string())
            }
            _ => DomainError::Internal(e.to_string()),
        }
    }
}

/// Open the database at `db_path` (":memory:" for an in-memory db) and migrate it
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Internal(format!("Failed to create db dir: {}", e)))?;
        }
    }

    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open db: {}", e)))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    run_migrations(&conn)?;

    let state = DbState::new(db_path.to_path_buf());
    *state.conn.lock().await = Some(conn);

    log::info!("Database ready at {}", db_path.display());
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            price_cents INTEGER NOT NULL DEFAULT 0,
            published INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS batches (
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            starts_on TEXT,
            capacity INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sections (
            id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
            section_id TEXT REFERENCES sections(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            starts_at TEXT,
            duration_minutes INTEGER,
            position INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
            student_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            enrolled_at INTEGER NOT NULL,
            UNIQUE (batch_id, student_id)
        );

        CREATE TABLE IF NOT EXISTS progress (
            enrollment_id TEXT NOT NULL REFERENCES enrollments(id) ON DELETE CASCADE,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            completed_at INTEGER NOT NULL,
            PRIMARY KEY (enrollment_id, session_id)
        );

        CREATE TABLE IF NOT EXISTS instructors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            bio TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course_instructors (
            course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            instructor_id TEXT NOT NULL REFERENCES instructors(id) ON DELETE CASCADE,
            assigned_at INTEGER NOT NULL,
            PRIMARY KEY (course_id, instructor_id)
        );

        CREATE TABLE IF NOT EXISTS blog_posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            body TEXT NOT NULL DEFAULT '',
            author_id TEXT REFERENCES instructors(id) ON DELETE SET NULL,
            published INTEGER NOT NULL DEFAULT 0,
            published_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            enrollment_id TEXT NOT NULL REFERENCES enrollments(id) ON DELETE CASCADE,
            amount_cents INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            reference TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )?;

    // Older databases predate discounts
    if !column_exists(conn, "courses", "discount_percent")? {
        conn.execute("ALTER TABLE courses ADD COLUMN discount_percent INTEGER", [])
            .map_err(|e| DomainError::Internal(format!("Failed to add discount_percent: {}", e)))?;
        log::info!("Migrated courses: added discount_percent");
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_batches_course ON batches(course_id);
        CREATE INDEX IF NOT EXISTS idx_sections_batch ON sections(batch_id, position);
        CREATE INDEX IF NOT EXISTS idx_sessions_scope ON sessions(batch_id, section_id, position);
        CREATE INDEX IF NOT EXISTS idx_enrollments_batch ON enrollments(batch_id);
        CREATE INDEX IF NOT EXISTS idx_course_instructors_instructor ON course_instructors(instructor_id);
        CREATE INDEX IF NOT EXISTS idx_payments_enrollment ON payments(enrollment_id);",
    )?;

    Ok(())
}
