//! SQLite record store for participants, templates and certificates.
//!
//! `Database` only remembers where the database lives; every unit of work opens
//! its own `Connection` (rusqlite connections are not `Sync`, and handlers run
//! their store calls inside `web::block`). The query functions in the
//! sub-modules take a `&Connection` so callers decide the scope of a unit of work.

pub mod certificates;
pub mod participants;
pub mod schema;
pub mod templates;

use crate::error::{Error, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Creates the database file and its parent directory if needed and makes
    /// sure the schema is current.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self { path };
        let conn = db.connect()?;
        schema::initialize_schema(&conn)?;
        info!("Database ready at {}", db.path.display());
        Ok(db)
    }

    pub fn connect(&self) -> Result<Connection> {
        debug!("Opening database at {}", self.path.display());
        let conn = Connection::open(&self.path).map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })?;
        schema::configure_connection(&conn)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
