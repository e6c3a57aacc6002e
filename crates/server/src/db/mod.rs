use std::{
    ffi::c_int,
    sync::Once,
    time::{Duration, Instant},
};

use deadpool_sqlite::{Config, Hook, HookError, Pool, PoolConfig, Runtime, Timeouts};
use include_dir::{include_dir, Dir};
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use rusqlite_migration::{Migrations, SchemaVersion};
use thiserror::Error;
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

pub mod model;

static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),
    #[error("Schema version {0} is outside of known schema migrations. Manual intervention required")]
    UnknownSchemaVersion(usize),
}

fn sqlite_connection_profiling_callback(query: &str, duration: Duration) {
    trace!(target: "sqlite_profiling", ?duration, query);
}

fn sqlite_connection_trace_callback(query: &str) {
    trace!(target: "sqlite_tracing", query);
}

fn sqlite_log_callback(sqlite_code: c_int, msg: &str) {
    use rusqlite::ffi;
    let err_code = ffi::Error::new(sqlite_code);

    // See https://www.sqlite.org/rescode.html for description of result codes.
    match sqlite_code & 0xff {
        ffi::SQLITE_NOTICE => info!(target: "sqlite", msg, %err_code, "SQLITE NOTICE"),
        ffi::SQLITE_WARNING => warn!(target: "sqlite", msg, %err_code, "SQLITE WARNING"),
        _ => error!(target: "sqlite", msg, %err_code, "SQLITE ERROR"),
    };
}

pub fn get_migrations() -> Result<Migrations<'static>, DbError> {
    Ok(Migrations::from_directory(&MIGRATIONS_DIR)?)
}

#[instrument(skip(conn))]
pub fn configure_new_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    run_pragmas(conn)?;

    if cfg!(debug_assertions) {
        conn.trace(Some(sqlite_connection_trace_callback));
    } else {
        // Hook up the profiling callback
        conn.profile(Some(sqlite_connection_profiling_callback));
    }

    Ok(())
}

#[instrument(skip(conn))]
pub fn run_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    // journal_mode reports the resulting mode back as a row. In-memory
    // databases stay on "memory"
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode);
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    // Entry rows rely on ON DELETE CASCADE which is off by default in sqlite
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

/// Opens a connection with the flags the server uses and configures it
pub fn open_connection(connection_string: &str) -> Result<Connection, DbError> {
    let open_flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_CREATE;

    let mut conn = Connection::open_with_flags(connection_string, open_flags)?;
    configure_new_connection(&mut conn)?;
    Ok(conn)
}

fn schema_version(migrations: &Migrations, conn: &Connection) -> Result<usize, DbError> {
    match migrations.current_version(conn)? {
        SchemaVersion::Inside(n) => Ok(n.into()),
        SchemaVersion::Outside(n) => Err(DbError::UnknownSchemaVersion(n.into())),
        SchemaVersion::NoneSet => Ok(0),
    }
}

/// Brings the schema on `conn` up to date. Returns the number of migrations
/// applied
#[instrument(skip(conn))]
pub fn migrate(conn: &mut Connection) -> Result<usize, DbError> {
    let migrations = get_migrations()?;
    let _span = span!(Level::INFO, "Running migrations").entered();

    let initial_version = schema_version(&migrations, conn)?;
    migrations.to_latest(conn)?;
    let final_version = schema_version(&migrations, conn)?;

    Ok(final_version - initial_version)
}

#[instrument]
pub fn run_migrations(connection_string: &str) -> Result<usize, DbError> {
    // Configure the log callback before opening the database
    static CONFIG_LOG: Once = Once::new();
    CONFIG_LOG.call_once(|| {
        // Fails with SQLITE_MISUSE once sqlite has been initialized by another connection
        if let Err(e) = unsafe { rusqlite::trace::config_log(Some(sqlite_log_callback)) } {
            warn!("Failed to install sqlite log callback: {e}");
        }
    });

    let mut conn = open_connection(connection_string)?;

    debug!("Checking DB is writable");
    conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

    let ran = migrate(&mut conn)?;

    close_database(conn)?;

    Ok(ran)
}

/// Builds the connection pool. Every new connection gets the same pragmas as
/// the migration connection
pub fn create_pool(
    connection_string: &str,
    max_size: usize,
    wait_timeout: Duration,
) -> Result<Pool, anyhow::Error> {
    let mut config = Config::new(connection_string);
    let mut pool_config = PoolConfig::new(max_size);
    pool_config.timeouts = Timeouts {
        wait: Some(wait_timeout),
        ..Timeouts::default()
    };
    config.pool = Some(pool_config);

    let pool = config
        .builder(Runtime::Tokio1)?
        .post_create(Hook::async_fn(|object, _| {
            Box::pin(async move {
                object
                    .interact(|conn| configure_new_connection(conn))
                    .await
                    .map_err(|e| HookError::Message(e.to_string()))?
                    .map_err(HookError::Backend)?;
                Ok(())
            })
        }))
        .build()?;

    Ok(pool)
}

/// Runs an optimize on the database. Should be run periodically to keep the
/// database running optimally. It should be very fast if run regularly
#[instrument(skip(conn))]
pub fn optimize_database(conn: &Connection) -> Result<Duration, DbError> {
    let start = Instant::now();
    conn.pragma_update(None, "analysis_limit", "400")?;
    conn.pragma_update(None, "optimize", "")?;

    Ok(start.elapsed())
}

#[instrument(skip(conn))]
pub fn close_database(conn: Connection) -> Result<(), DbError> {
    let d1 = optimize_database(&conn)?;
    let d2 = vacuum_database(&conn)?;

    info!(
        "Optimize db took: {:.3}, vacuum took: {:.3}, total: {:.3}",
        d1.as_secs_f32(),
        d2.as_secs_f32(),
        (d1 + d2).as_secs_f32()
    );
    if let Err((_conn, e)) = conn.close() {
        Err(e)?;
    }

    Ok(())
}

// Vacuums the database to free up space and improve fragmentation
#[instrument(skip(conn))]
pub fn vacuum_database(conn: &Connection) -> Result<Duration, DbError> {
    let start = Instant::now();
    conn.execute("VACUUM", ())?;
    Ok(start.elapsed())
}

/// In-memory connection with the full schema applied
#[cfg(test)]
pub fn test_connection() -> Connection {
    let mut conn = open_connection(":memory:").expect("open in-memory db");
    migrate(&mut conn).expect("migrate in-memory db");
    conn
}
