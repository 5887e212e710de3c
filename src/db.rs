use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tokio::fs;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Connection pool used by the cart/favorites/audit paths.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// SeaORM connection used by the order path.
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Apply the SQL files in `migrations/` in filename order. The files are
/// idempotent, so re-running against an up-to-date database is harmless.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    let mut sql_files: Vec<PathBuf> = Vec::new();
    let mut entries = fs::read_dir("migrations").await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            sql_files.push(path);
        }
    }
    sql_files.sort();

    let backend = conn.get_database_backend();
    for file in sql_files {
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements hold a single command, so run the
        // file statement by statement.
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            conn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await?;
        }
    }

    Ok(())
}
