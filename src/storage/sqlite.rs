//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use super::schema::{self, Schema};
use super::value::Value;
use crate::record::Record;
use crate::{Error, Result};

/// SQLite-backed storage for scraped records
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create the table of every managed record kind
    fn initialize_schema(&self) -> Result<()> {
        for schema in schema::MANAGED {
            schema.create_table(&self.conn)?;
        }
        Ok(())
    }

    /// Close the connection, reporting any error SQLite raises on close
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    // ========== Existence Checks ==========

    /// Whether a row with the record's unique-key value is already stored
    pub fn exists<R: Record>(&self, record: &R) -> Result<bool> {
        match record.unique_value() {
            Some(key) => R::schema().exists(&self.conn, key),
            None => Ok(false),
        }
    }

    /// Whether a record of kind `R` with the given unique-key value is stored
    pub fn contains<R: Record>(&self, key: impl Into<Value>) -> Result<bool> {
        R::schema().exists(&self.conn, &key.into())
    }

    // ========== Inserts ==========

    /// Insert a single record unless one with the same unique key exists.
    ///
    /// Accepts `Option<R>` as well; `None` is a no-op. Returns whether a row
    /// was written.
    pub fn insert<R: Record>(&self, record: impl Into<Option<R>>) -> Result<bool> {
        let Some(record) = record.into() else {
            return Ok(false);
        };
        let schema = R::schema();
        if self.exists(&record)? {
            debug!(table = schema.table, key = ?record.unique_value(), "skipping existing row");
            return Ok(false);
        }

        let record = record.sanitize()?;
        self.conn.execute(
            &schema.insert_statement(),
            params_from_iter(checked_row(schema, &record)?),
        )?;
        Ok(true)
    }

    /// Insert a batch of records of one kind in a single transaction.
    ///
    /// Records already stored are filtered out one at a time first, as are
    /// repeats of a unique key within the batch. Returns the number of rows
    /// written.
    pub fn insert_many<R: Record>(&self, records: impl IntoIterator<Item = R>) -> Result<usize> {
        let schema = R::schema();
        let mut survivors: Vec<R> = Vec::new();

        for record in records {
            if self.exists(&record)? {
                debug!(table = schema.table, key = ?record.unique_value(), "skipping existing row");
                continue;
            }
            let repeated = match record.unique_value() {
                Some(key) if !key.is_null() => survivors
                    .iter()
                    .any(|kept| kept.unique_value() == Some(key)),
                _ => false,
            };
            if repeated {
                debug!(table = schema.table, key = ?record.unique_value(), "skipping repeated key in batch");
                continue;
            }
            survivors.push(record.sanitize()?);
        }

        if survivors.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&schema.insert_statement())?;
            for record in &survivors {
                stmt.execute(params_from_iter(checked_row(schema, record)?))?;
            }
        }
        tx.commit()?;

        debug!(table = schema.table, rows = survivors.len(), "inserted batch");
        Ok(survivors.len())
    }

    // ========== Counts ==========

    /// Count rows stored for record kind `R`
    pub fn count<R: Record>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::schema().table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Row values of a record, checked against the schema's column count
fn checked_row<'a, R: Record>(schema: &Schema, record: &'a R) -> Result<&'a [Value]> {
    let row = record.to_row();
    if row.len() != schema.fields.len() {
        return Err(Error::ColumnMismatch {
            table: schema.table,
            expected: schema.fields.len(),
            found: row.len(),
        });
    }
    Ok(row)
}
