//! # Database Migration System
//!
//! Schema management for the entity link tables with proper concurrency
//! control.
//!
//! ## Overview
//!
//! The module implements a hybrid migration strategy:
//! - **Development/Production**: incremental migrations with version tracking
//! - **Testing**: fresh schema rebuilds whenever the migration set has
//!   advanced, with database-level locking so parallel test threads do not
//!   race each other; a rerun against a current schema leaves it untouched
//!
//! ## Concurrency Control
//!
//! Test rebuilds take a PostgreSQL advisory lock; threads that lose the race
//! poll for the tracking table instead of rebuilding:
//!
//! ```sql
//! SELECT pg_try_advisory_lock(7297123648095837)
//! ```
//!
//! ## Migration Discovery
//!
//! Migrations are discovered from the `migrations/` directory using a
//! timestamp-based naming convention: `YYYYMMDDHHMMSS_description.sql`

use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EntityLinkError, Result};

/// Represents a single database migration file.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version timestamp (YYYYMMDDHHMMSS format)
    pub version: String,
    /// Human-readable migration name
    pub name: String,
    /// Full path to the SQL file
    pub path: PathBuf,
}

/// Manages database schema migrations with concurrency safety.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all migrations in order
    pub async fn run_all(pool: &PgPool) -> Result<()> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
        let is_test = database_url.contains("test");

        if is_test {
            // Test databases rebuild from scratch under an advisory lock
            // whenever the migration set has advanced
            Self::run_fresh_schema_with_lock(pool).await?;
            return Ok(());
        }

        Self::ensure_migration_table(pool).await?;
        Self::run_outstanding_migrations(pool).await
    }

    /// Rebuild the test schema under a database lock, unless it is current
    async fn run_fresh_schema_with_lock(pool: &PgPool) -> Result<()> {
        const LOCK_KEY: i64 = 7297123648095837;

        let lock_acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock($1)")
            .bind(LOCK_KEY)
            .fetch_one(pool)
            .await?;

        if lock_acquired {
            let result = match Self::schema_is_current(pool).await {
                Ok(true) => Ok(()),
                Ok(false) => Self::run_fresh_schema(pool).await,
                Err(err) => Err(err),
            };

            // Always release the lock
            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(LOCK_KEY)
                .execute(pool)
                .await?;

            result
        } else {
            Self::wait_for_schema_ready(pool).await
        }
    }

    /// A test schema is current when the tracking table exists and every
    /// discovered migration has been applied
    async fn schema_is_current(pool: &PgPool) -> Result<bool> {
        let table_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = 'entitylink_schema_migrations')"
        )
        .fetch_one(pool)
        .await?;

        if !table_exists {
            return Ok(false);
        }

        let applied = Self::get_applied_migrations(pool).await?;
        let migrations = Self::discover_migrations()?;
        Ok(migrations.keys().all(|version| applied.contains(version)))
    }

    /// Wait for another thread to finish initializing the schema
    async fn wait_for_schema_ready(pool: &PgPool) -> Result<()> {
        use tokio::time::{sleep, Duration};

        // Wait up to 30 seconds for schema to be ready
        for _ in 0..60 {
            sleep(Duration::from_millis(500)).await;

            let schema_ready = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = 'entitylink_schema_migrations')"
            )
            .fetch_one(pool)
            .await?;

            if schema_ready {
                return Ok(());
            }
        }

        Err(EntityLinkError::storage(
            "migrations",
            "Timeout waiting for schema initialization",
        ))
    }

    /// Drop and recreate everything, then run all discovered migrations
    async fn run_fresh_schema(pool: &PgPool) -> Result<()> {
        sqlx::raw_sql(
            r#"
            DROP SCHEMA public CASCADE;
            CREATE SCHEMA public;
            GRANT ALL ON SCHEMA public TO PUBLIC;
        "#,
        )
        .execute(pool)
        .await?;

        Self::ensure_migration_table(pool).await?;

        let migrations = Self::discover_migrations()?;
        for migration in migrations.values() {
            Self::run_migration(pool, &migration.path.to_string_lossy()).await?;
            Self::record_migration(pool, &migration.version).await?;
        }

        Ok(())
    }

    /// Run only outstanding migrations (not already applied)
    async fn run_outstanding_migrations(pool: &PgPool) -> Result<()> {
        let migrations = Self::discover_migrations()?;
        let applied_migrations = Self::get_applied_migrations(pool).await?;

        for migration in migrations.values() {
            if !applied_migrations.contains(&migration.version) {
                tracing::info!(
                    version = %migration.version,
                    name = %migration.name,
                    "Applying migration"
                );
                Self::run_migration(pool, &migration.path.to_string_lossy()).await?;
                Self::record_migration(pool, &migration.version).await?;
            }
        }

        Ok(())
    }

    /// Discover all migration files in the migrations directory
    fn discover_migrations() -> Result<BTreeMap<String, Migration>> {
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let migrations_dir = project_root.join("migrations");

        if !migrations_dir.exists() {
            return Ok(BTreeMap::new());
        }

        let mut migrations = BTreeMap::new();

        let entries = fs::read_dir(migrations_dir)
            .map_err(|e| EntityLinkError::storage("discover_migrations", e.to_string()))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| EntityLinkError::storage("discover_migrations", e.to_string()))?;
            let path = entry.path();

            if path.is_file() && path.extension().map(|s| s == "sql").unwrap_or(false) {
                if let Some(filename) = path.file_stem().and_then(|s| s.to_str()) {
                    // Parse filename: YYYYMMDDHHMMSS_migration_name.sql
                    if let Some((version, name)) = Self::parse_migration_filename(filename) {
                        migrations.insert(version.clone(), Migration {
                            version,
                            name,
                            path,
                        });
                    }
                }
            }
        }

        Ok(migrations)
    }

    /// Parse migration filename to extract version and name
    fn parse_migration_filename(filename: &str) -> Option<(String, String)> {
        // Expected format: YYYYMMDDHHMMSS_migration_name
        if filename.len() < 15 {
            return None;
        }

        let (version_part, name_part) = filename.split_at(14);

        if !version_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let name = if let Some(stripped) = name_part.strip_prefix('_') {
            stripped.replace('_', " ")
        } else {
            name_part.replace('_', " ")
        };

        Some((version_part.to_string(), name))
    }

    /// Ensure migration tracking table exists
    async fn ensure_migration_table(pool: &PgPool) -> Result<()> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS entitylink_schema_migrations (
                version VARCHAR(14) PRIMARY KEY,
                applied_at TIMESTAMPTZ DEFAULT NOW()
            )
        "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get list of applied migration versions
    async fn get_applied_migrations(pool: &PgPool) -> Result<std::collections::HashSet<String>> {
        let rows = sqlx::query("SELECT version FROM entitylink_schema_migrations")
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("version"))
            .collect())
    }

    /// Record that a migration has been applied
    async fn record_migration(pool: &PgPool, version: &str) -> Result<()> {
        sqlx::query("INSERT INTO entitylink_schema_migrations (version) VALUES ($1)")
            .bind(version)
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn run_migration(pool: &PgPool, migration_path: &str) -> Result<()> {
        if !Path::new(migration_path).exists() {
            tracing::warn!(path = %migration_path, "Migration file not found, skipping");
            return Ok(());
        }

        let sql = std::fs::read_to_string(migration_path)
            .map_err(|e| EntityLinkError::storage("run_migration", e.to_string()))?;

        sqlx::raw_sql(&sql).execute(pool).await?;

        Ok(())
    }
}
