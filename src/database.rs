//! Database connection setup and schema migration.

use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Connects to `database_url` and applies pending migrations.
///
/// SQLite is pinned to a single pooled connection: an in-memory database only
/// exists on the connection that created it.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", mask_connection_string(database_url));

    let mut opt = ConnectOptions::new(database_url);
    if database_url.starts_with("sqlite") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(10).min_connections(2);
    }
    opt.connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.ping().await?;

    Migrator::up(&db, None).await?;
    info!("Database ready, migrations applied");

    Ok(db)
}

/// Hides credentials in a connection string before it is logged.
fn mask_connection_string(conn_str: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (conn_str.find('@'), conn_str.find("//")) {
        if scheme_end < at_pos {
            return format!("{}****{}", &conn_str[..scheme_end + 2], &conn_str[at_pos..]);
        }
    }
    conn_str.to_string()
}
