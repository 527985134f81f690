// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management.
//!
//! A single [`Database`] wraps one `tokio_rusqlite` connection; rusqlite
//! serializes all access through that connection's worker thread, which is
//! what gives the message log its single-writer append ordering.

use frontdesk_core::FrontdeskError;
use tokio_rusqlite::Connection;

/// Handle to the service database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply pragmas, and run any
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, FrontdeskError> {
        // Connection::open surfaces a bare rusqlite error.
        let conn = Connection::open(path).await.map_err(|e| map_tr_err(e.into()))?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let migration_result = conn
            .call(|conn| Ok(crate::migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)?;
        migration_result?;

        Ok(Self { conn })
    }

    /// The underlying async connection, for use by the query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush the WAL back into the main database file.
    ///
    /// The connection itself is closed when the handle is dropped.
    pub async fn close(&self) -> Result<(), FrontdeskError> {
        self.conn
            .call(|conn| {
                // wal_checkpoint reports (busy, log, checkpointed); discard it.
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_row| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a `tokio_rusqlite` error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> FrontdeskError {
    FrontdeskError::Storage {
        source: Box::new(e),
    }
}
