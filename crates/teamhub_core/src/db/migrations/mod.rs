//! Schema migration registry and executor.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - All pending migrations are applied in a single transaction.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction().map_err(DbError::Configure)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let failed = |source: rusqlite::Error| DbError::Migration {
            version: migration.version,
            source,
        };
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .map_err(failed)?;
    }
    tx.commit().map_err(|source| DbError::Migration {
        version: latest,
        source,
    })
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .map_err(DbError::Configure)
}
