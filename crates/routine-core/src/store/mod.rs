//! Durable storage for generated plans.
//!
//! [`PlanStore`] is the async face of the store. Each call opens its own
//! SQLite connection on tokio's blocking pool and drops it before returning,
//! so independent requests never share a connection.
//!
//! ```rust,no_run
//! use routine_core::PlanStore;
//!
//! # async fn example() -> routine_core::Result<()> {
//! let store = PlanStore::open(Some("routine.db")).await?;
//! let id = store
//!     .create("asst_1", "thread_1", "- Goal: Lose fat", "Do squats.")
//!     .await?;
//! store.update(id, "athlete@example.com").await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    error::{Result, RoutineError},
    models::PlanRecord,
};

pub mod database;

pub use database::Database;

/// Record store backed by a SQLite file.
#[derive(Debug, Clone)]
pub struct PlanStore {
    db_path: PathBuf,
}

impl PlanStore {
    /// Prepares the database file (creating parent directories and the
    /// schema) and returns a store bound to it.
    ///
    /// If no path is given, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/routine/routine.db` or
    /// `~/.local/share/routine/routine.db`.
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::FileSystem` if the parent directory cannot be
    /// created, `RoutineError::Persistence` if schema setup fails.
    pub async fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let db_path = match path {
            Some(path) => path.as_ref().to_path_buf(),
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RoutineError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let store = Self { db_path };
        store.with_database(|_db| Ok(())).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Persists a completed generation and returns the new record's id.
    /// `generated_at` is stamped at the moment of the call.
    pub async fn create(
        &self,
        assistant_id: &str,
        thread_id: &str,
        prompt: &str,
        plan_text: &str,
    ) -> Result<u64> {
        let assistant_id = assistant_id.to_string();
        let thread_id = thread_id.to_string();
        let prompt = prompt.to_string();
        let plan_text = plan_text.to_string();

        let record = self
            .with_database(move |db| {
                db.create_record(&assistant_id, &thread_id, &prompt, &plan_text)
            })
            .await?;
        Ok(record.id)
    }

    /// Sets or overwrites the delivery address of record `id`, leaving
    /// every other field untouched.
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::NotFound` if no record has that id; nothing is
    /// inserted in that case.
    pub async fn update(&self, id: u64, email: &str) -> Result<()> {
        let email = email.to_string();
        self.with_database(move |db| db.update_email(id, &email))
            .await
    }

    /// Retrieves a record by its ID.
    pub async fn get(&self, id: u64) -> Result<Option<PlanRecord>> {
        self.with_database(move |db| db.get_record(id)).await
    }

    /// Lists up to `limit` records, newest first.
    pub async fn list(&self, limit: u32) -> Result<Vec<PlanRecord>> {
        self.with_database(move |db| db.list_records(limit)).await
    }

    async fn with_database<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            op(&db)
        })
        .await
        .map_err(RoutineError::join)?
    }

    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("routine")
            .place_data_file("routine.db")
            .map_err(|e| RoutineError::XdgDirectory(e.to_string()))
    }
}
