//! # Test Utilities
//!
//! Centralized helpers for testing that work both locally and in CI
//! environments. Database-backed tests opt in by setting `DATABASE_URL`;
//! without it, [`connect_test_pool`] returns `None` and callers skip.

use std::env;

use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;
use crate::storage::{DatabaseConnection, DatabaseMigrations};

static MIGRATIONS: OnceCell<bool> = OnceCell::const_new();

/// Setup test environment variables if they're not already present
pub fn setup_test_environment() {
    if env::var("ENTITYLINK_ENV").is_err() {
        env::set_var("ENTITYLINK_ENV", "test");
    }
}

/// Get the database URL for tests, if one was provided
pub fn test_database_url() -> Option<String> {
    env::var("DATABASE_URL").ok()
}

/// Connect to the test database and make sure the schema is in place.
///
/// Returns `None` (after logging why) when `DATABASE_URL` is unset or the
/// database cannot be reached, so database-backed tests degrade to skips on
/// machines without Postgres. Migrations run once per test binary.
pub async fn connect_test_pool() -> Option<PgPool> {
    let config = DatabaseConfig {
        url: test_database_url()?,
        pool: 5,
        connect_timeout_seconds: 30,
        migrate_on_startup: false,
    };

    let pool = match DatabaseConnection::from_config(&config).await {
        Ok(connection) => connection.pool().clone(),
        Err(err) => {
            eprintln!("skipping database-backed test: connect failed: {err}");
            return None;
        }
    };

    let migrated = MIGRATIONS
        .get_or_init(|| async {
            match DatabaseMigrations::run_all(&pool).await {
                Ok(()) => true,
                Err(err) => {
                    eprintln!("skipping database-backed test: migrations failed: {err}");
                    false
                }
            }
        })
        .await;

    if *migrated {
        Some(pool)
    } else {
        None
    }
}
