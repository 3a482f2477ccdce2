use std::{path::Path, time::Duration};

use leaderboard_app::ports::store::{
    AttributeType, AttributeValue, Mutation, Record, Store, StoreError, StoreResult, TableSchema,
};
use log::info;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use thiserror::Error;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    ConnectionError(#[from] r2d2::Error),
    #[error("query error: {0}")]
    QueryError(#[from] rusqlite::Error),
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<DatabaseError> for StoreError {
    fn from(value: DatabaseError) -> Self {
        StoreError::Backend(value.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn column_type(ty: AttributeType) -> &'static str {
    match ty {
        AttributeType::S => "TEXT NOT NULL",
        AttributeType::N => "INTEGER NOT NULL",
    }
}

fn to_sql_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::Text(s.clone()),
        AttributeValue::N(n) => Value::Integer(*n),
    }
}

/// Store backed by one SQLite table with a column per schema attribute.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    schema: TableSchema,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, pool_size: u32, schema: TableSchema) -> DatabaseResult<Self> {
        for name in std::iter::once(&schema.table)
            .chain(std::iter::once(&schema.key))
            .chain(schema.attributes.iter().map(|(name, _)| name))
        {
            if !is_valid_identifier(name) {
                return Err(DatabaseError::InvalidIdentifier(name.clone()));
            }
        }

        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let store = Self { pool, schema };
        store.create_table()?;
        info!(
            "Opened SQLite store '{}' (table '{}')",
            path.as_ref().display(),
            store.schema.table
        );
        Ok(store)
    }

    fn get_connection(&self) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn create_table(&self) -> DatabaseResult<()> {
        let mut columns = vec![format!("{} TEXT PRIMARY KEY NOT NULL", self.schema.key)];
        for (name, ty) in &self.schema.attributes {
            columns.push(format!("{} {}", name, column_type(*ty)));
        }
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.schema.table,
            columns.join(", ")
        );
        self.get_connection()?.execute(&query, [])?;
        Ok(())
    }

    fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.schema.key.as_str())
            .chain(self.schema.attributes.iter().map(|(name, _)| name.as_str()))
            .collect()
    }

    fn record_from_row(&self, row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let mut record = Record::new();
        record.insert(
            self.schema.key.clone(),
            AttributeValue::S(row.get::<_, String>(0)?),
        );
        for (index, (name, ty)) in self.schema.attributes.iter().enumerate() {
            let value = match ty {
                AttributeType::S => AttributeValue::S(row.get(index + 1)?),
                AttributeType::N => AttributeValue::N(row.get(index + 1)?),
            };
            record.insert(name.clone(), value);
        }
        Ok(record)
    }

    fn scan(&self) -> DatabaseResult<Vec<Record>> {
        let query = format!(
            "SELECT {} FROM {}",
            self.column_names().join(", "),
            self.schema.table
        );
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map([], |row| self.record_from_row(row))?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    fn insert_if_absent(&self, key: &str, record: &Record) -> DatabaseResult<usize> {
        let mut params = vec![Value::Text(key.to_string())];
        for (name, ty) in &self.schema.attributes {
            match record.get(name) {
                Some(value) if value_matches(value, *ty) => params.push(to_sql_value(value)),
                _ => {
                    return Err(DatabaseError::InvalidRecord(format!(
                        "missing or mistyped attribute '{}'",
                        name
                    )));
                }
            }
        }
        let columns = self.column_names();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>();
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO NOTHING",
            self.schema.table,
            columns.join(", "),
            placeholders.join(", "),
            self.schema.key
        );
        let conn = self.get_connection()?;
        Ok(conn.execute(&query, rusqlite::params_from_iter(params.iter()))?)
    }

    fn update_existing(&self, key: &str, mutation: &Mutation) -> DatabaseResult<usize> {
        let mut sets = Vec::new();
        let mut params = Vec::new();
        for (name, value) in mutation.assignments() {
            match self.schema.attribute_type(name) {
                Some(ty) if name != &self.schema.key && value_matches(value, ty) => {
                    params.push(to_sql_value(value));
                    sets.push(format!("{} = ?{}", name, params.len()));
                }
                _ => {
                    return Err(DatabaseError::InvalidRecord(format!(
                        "cannot assign attribute '{}'",
                        name
                    )));
                }
            }
        }
        if sets.is_empty() {
            sets.push(format!("{0} = {0}", self.schema.key));
        }
        params.push(Value::Text(key.to_string()));
        let query = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.schema.table,
            sets.join(", "),
            self.schema.key,
            params.len()
        );
        let conn = self.get_connection()?;
        Ok(conn.execute(&query, rusqlite::params_from_iter(params.iter()))?)
    }

    fn delete_key(&self, key: &str) -> DatabaseResult<()> {
        let query = format!(
            "DELETE FROM {} WHERE {} = ?1",
            self.schema.table, self.schema.key
        );
        self.get_connection()?.execute(&query, [key])?;
        Ok(())
    }
}

fn value_matches(value: &AttributeValue, ty: AttributeType) -> bool {
    matches!(
        (value, ty),
        (AttributeValue::S(_), AttributeType::S) | (AttributeValue::N(_), AttributeType::N)
    )
}

impl Store for SqliteStore {
    fn scan_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.scan()?)
    }

    fn conditional_put(&self, key: &str, record: Record) -> StoreResult<()> {
        match self.insert_if_absent(key, &record)? {
            0 => Err(StoreError::ConditionViolation),
            _ => Ok(()),
        }
    }

    fn conditional_update(&self, key: &str, mutation: &Mutation) -> StoreResult<()> {
        match self.update_existing(key, mutation)? {
            0 => Err(StoreError::ConditionViolation),
            _ => Ok(()),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        Ok(self.delete_key(key)?)
    }
}
