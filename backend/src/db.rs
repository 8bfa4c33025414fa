use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{EstateError, EstateResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Per-connection settings SQLite does not persist in the database file.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

pub fn establish_pool(database_url: &str, size: u32) -> EstateResult<DbPool> {
    log::info!("Opening database {} with {} connections", database_url, size);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| {
            log::error!("Failed to establish database pool: {}", e);
            EstateError::Pool(e)
        })?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> EstateResult<()> {
    let mut pooled = pool.get()?;
    let conn: &mut SqliteConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| EstateError::Migration(e.to_string()))?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// A migrated private database. One connection, so every checkout sees the
/// same in-memory data.
pub fn in_memory_pool() -> EstateResult<DbPool> {
    let pool = establish_pool(":memory:", 1)?;
    run_migrations(&pool)?;
    Ok(pool)
}
