pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::{Connection, Transaction};

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

// A failed step rolls back to its savepoint only; the caller gets `None`.
pub fn best_effort<T>(
    tx: &mut Transaction<'_>,
    step: &str,
    booking_id: &str,
    f: impl FnOnce(&Connection) -> anyhow::Result<T>,
) -> Option<T> {
    let sp = match tx.savepoint() {
        Ok(sp) => sp,
        Err(e) => {
            tracing::warn!(step, booking_id, error = %e, "failed to open savepoint");
            return None;
        }
    };

    // Dropping an uncommitted savepoint rolls it back.
    match f(&sp) {
        Ok(value) => match sp.commit() {
            Ok(()) => Some(value),
            Err(e) => {
                tracing::warn!(step, booking_id, error = %e, "best-effort step failed to commit");
                None
            }
        },
        Err(e) => {
            tracing::warn!(step, booking_id, error = %e, "best-effort step failed");
            None
        }
    }
}
