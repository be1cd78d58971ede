//! Application state shared by every request handler.
//!
//! `AppState` is built once in `main.rs` from the loaded `Config` and handed to
//! actix as `web::Data<AppState>`. Handlers get the configuration and the
//! database handle from here instead of from process-wide globals.

use crate::config::Config;
use crate::error::Result;
use crate::storage::Database;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    /// Creates the upload directories and opens (or creates) the database.
    pub fn initialize(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.templates_dir)?;
        std::fs::create_dir_all(&config.storage.certificates_dir)?;
        let db = Database::initialize(&config.storage.database_path)?;
        Ok(Self {
            config: Arc::new(config),
            db,
        })
    }

    pub fn templates_dir(&self) -> &Path {
        &self.config.storage.templates_dir
    }

    pub fn certificates_dir(&self) -> &Path {
        &self.config.storage.certificates_dir
    }
}


#[cfg(test)]
mod tests {
    use super::testing::temp_state;

    #[test]
    fn initialize_creates_directories() {
        let (_dir, state) = temp_state();
        assert!(state.templates_dir().is_dir());
        assert!(state.certificates_dir().is_dir());
        assert!(state.db.path().exists());
    }
}
