//! SQLite trade store.
//!
//! The pool is owned by the store value: [`SqliteStore::open`] builds it and
//! prepares the schema, [`SqliteStore::shutdown`] releases every connection.
//! Callers pass the store to whatever needs it; nothing connects lazily.

use crate::domain::config_validation::pool_size;
use crate::domain::error::DashboardError;
use crate::domain::record::RawTradeDocument;
use crate::domain::version::VersionRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_store_port::TradeStorePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Transaction};

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn db_err(e: r2d2::Error) -> DashboardError {
    DashboardError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> DashboardError {
    DashboardError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteStore {
    /// Build the pool from `[store] path` / `pool_size` and make sure the
    /// schema exists.
    pub fn open(config: &dyn ConfigPort) -> Result<Self, DashboardError> {
        let db_path = config
            .get_string("store", "path")
            .ok_or_else(|| DashboardError::ConfigMissing {
                section: "store".into(),
                key: "path".into(),
            })?;

        let pool_size = pool_size(config)?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_err)?;

        let store = Self { pool };
        store.initialize_schema()?;
        tracing::debug!(path = %db_path, pool_size, "opened sqlite store");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, DashboardError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(db_err)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Drop the pool and close its connections.
    pub fn shutdown(self) {
        let state = self.pool.state();
        tracing::debug!(
            connections = state.connections,
            idle = state.idle_connections,
            "closing sqlite store"
        );
        drop(self.pool);
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, DashboardError> {
        self.pool.get().map_err(db_err)
    }

    pub fn initialize_schema(&self) -> Result<(), DashboardError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS versions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                version TEXT NOT NULL UNIQUE,
                date TEXT NOT NULL,
                balance REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trades (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                symbol TEXT,
                side TEXT,
                profit TEXT,
                ror TEXT,
                balance TEXT,
                enter_time TEXT,
                close_time TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_trades_collection ON trades(collection);",
        )
        .map_err(query_err)?;
        Ok(())
    }

    /// Store a run and its trades atomically: either both the version row and
    /// every trade row are committed, or nothing is.
    pub fn insert_run(
        &self,
        version: &VersionRecord,
        docs: &[RawTradeDocument],
    ) -> Result<usize, DashboardError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute(
            "INSERT INTO versions (id, version, date, balance) VALUES (?1, ?2, ?3, ?4)",
            params![version.id, version.version, version.date, version.balance],
        )
        .map_err(query_err)?;
        insert_trade_rows(&tx, version.collection(), docs)?;
        tx.commit().map_err(query_err)?;

        tracing::debug!(version = %version.version, rows = docs.len(), "inserted run");
        Ok(docs.len())
    }
}

fn insert_trade_rows(
    tx: &Transaction<'_>,
    collection: &str,
    docs: &[RawTradeDocument],
) -> Result<(), DashboardError> {
    let mut stmt = tx
        .prepare(
            "INSERT INTO trades (collection, symbol, side, profit, ror, balance, enter_time, close_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(query_err)?;

    for doc in docs {
        stmt.execute(params![
            collection,
            doc.symbol,
            doc.side,
            doc.profit,
            doc.ror,
            doc.balance,
            doc.enter_time,
            doc.close_time
        ])
        .map_err(query_err)?;
    }
    Ok(())
}

impl TradeStorePort for SqliteStore {
    fn list_versions(&self) -> Result<Vec<VersionRecord>, DashboardError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, version, date, balance FROM versions ORDER BY seq ASC")
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(VersionRecord {
                    id: row.get(0)?,
                    version: row.get(1)?,
                    date: row.get(2)?,
                    balance: row.get(3)?,
                })
            })
            .map_err(query_err)?;

        let mut versions = Vec::new();
        for row in rows {
            versions.push(row.map_err(query_err)?);
        }
        Ok(versions)
    }

    fn fetch_trades(&self, collection: &str) -> Result<Vec<RawTradeDocument>, DashboardError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, side, profit, ror, balance, enter_time, close_time
                 FROM trades WHERE collection = ?1 ORDER BY seq ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok(RawTradeDocument {
                    symbol: row.get(0)?,
                    side: row.get(1)?,
                    profit: row.get(2)?,
                    ror: row.get(3)?,
                    balance: row.get(4)?,
                    enter_time: row.get(5)?,
                    close_time: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row.map_err(query_err)?);
        }
        Ok(docs)
    }

    fn delete_version(&self, id: &str) -> Result<bool, DashboardError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        let collection: Option<String> = tx
            .query_row(
                "SELECT version FROM versions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;

        let Some(collection) = collection else {
            return Ok(false);
        };

        let purged = tx
            .execute("DELETE FROM trades WHERE collection = ?1", params![collection])
            .map_err(query_err)?;
        tx.execute("DELETE FROM versions WHERE id = ?1", params![id])
            .map_err(query_err)?;
        tx.commit().map_err(query_err)?;

        tracing::info!(id, version = %collection, purged, "deleted run");
        Ok(true)
    }
}
