//! SQLite operations on the `plan_records` table.

use std::path::Path;
use std::time::Duration;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, Result, RoutineError},
    models::PlanRecord,
};

const SELECT_RECORD: &str =
    "SELECT id, assistant_id, thread_id, prompt, plan_text, generated_at, email FROM plan_records";

// Concurrent requests each hold their own connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-connection handle. Opened per operation and dropped afterwards.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection and applies the embedded schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")
    }

    /// Inserts a record stamped with the current time and returns its id.
    pub fn create_record(
        &self,
        assistant_id: &str,
        thread_id: &str,
        prompt: &str,
        plan_text: &str,
    ) -> Result<PlanRecord> {
        let now = Timestamp::now();

        self.connection
            .execute(
                "INSERT INTO plan_records (assistant_id, thread_id, prompt, plan_text, generated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![assistant_id, thread_id, prompt, plan_text, now.to_string()],
            )
            .db_context("Failed to insert plan record")?;

        let id = self.connection.last_insert_rowid() as u64;

        Ok(PlanRecord {
            id,
            assistant_id: assistant_id.to_string(),
            thread_id: thread_id.to_string(),
            prompt: prompt.to_string(),
            plan_text: plan_text.to_string(),
            generated_at: now,
            email: None,
        })
    }

    /// Sets the delivery address of an existing record. Never inserts.
    pub fn update_email(&self, id: u64, email: &str) -> Result<()> {
        let rows_affected = self
            .connection
            .execute(
                "UPDATE plan_records SET email = ?1 WHERE id = ?2",
                params![email, id as i64],
            )
            .db_context("Failed to update plan record")?;

        if rows_affected == 0 {
            return Err(RoutineError::NotFound { id });
        }
        Ok(())
    }

    /// Retrieves a record by its ID.
    pub fn get_record(&self, id: u64) -> Result<Option<PlanRecord>> {
        let mut stmt = self
            .connection
            .prepare(&format!("{SELECT_RECORD} WHERE id = ?1"))
            .db_context("Failed to prepare query")?;

        stmt.query_row(params![id as i64], record_from_row)
            .optional()
            .db_context("Failed to query plan record")
    }

    /// Lists up to `limit` records, newest first. Ids grow with insert order.
    pub fn list_records(&self, limit: u32) -> Result<Vec<PlanRecord>> {
        let mut stmt = self
            .connection
            .prepare(&format!(
                "{SELECT_RECORD} ORDER BY id DESC LIMIT ?1"
            ))
            .db_context("Failed to prepare query")?;

        let records = stmt
            .query_map(params![limit], record_from_row)
            .db_context("Failed to query plan records")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch plan records")?;

        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PlanRecord> {
    Ok(PlanRecord {
        id: row.get::<_, i64>(0)? as u64,
        assistant_id: row.get(1)?,
        thread_id: row.get(2)?,
        prompt: row.get(3)?,
        plan_text: row.get(4)?,
        generated_at: row.get::<_, String>(5)?.parse::<Timestamp>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        email: row.get(6)?,
    })
}
