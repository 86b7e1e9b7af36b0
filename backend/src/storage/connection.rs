use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::DatabaseConfig;

/// DbConnection owns the SQLite pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the database described by the application config
    pub async fn init(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.url, config.max_connections).await
    }

    /// Initialize a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since every
    /// SQLite in-memory connection is its own database.
    pub async fn init_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS children (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                name TEXT NOT NULL,
                birthdate TEXT NOT NULL,
                allergies TEXT NOT NULL DEFAULT '[]',
                notes TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_children_family_name
            ON children(family_id, name);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT,
                category TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                geofence_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                geofence_radius_m REAL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                CHECK (geofence_enabled = FALSE OR (geofence_radius_m IS NOT NULL AND geofence_radius_m > 0))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_locations_family_name
            ON locations(family_id, name);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS check_ins (
                id TEXT PRIMARY KEY,
                location_id TEXT NOT NULL,
                child_id TEXT,
                timestamp INTEGER NOT NULL,
                notes TEXT,
                FOREIGN KEY (location_id) REFERENCES locations (id) ON DELETE CASCADE,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_check_ins_timestamp
            ON check_ins(timestamp DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS location_samples (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                accuracy_m REAL,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_location_samples_child_timestamp
            ON location_samples(child_id, timestamp DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // One row per (child, location) pair; version backs the optimistic update
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS containment_states (
                child_id TEXT NOT NULL,
                location_id TEXT NOT NULL,
                is_inside BOOLEAN NOT NULL,
                version INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (child_id, location_id),
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE,
                FOREIGN KEY (location_id) REFERENCES locations (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS geofence_alerts (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                child_id TEXT NOT NULL,
                location_id TEXT NOT NULL,
                alert_type TEXT NOT NULL CHECK (alert_type IN ('enter', 'leave')),
                timestamp INTEGER NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT FALSE,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE,
                FOREIGN KEY (location_id) REFERENCES locations (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_geofence_alerts_family_timestamp
            ON geofence_alerts(family_id, timestamp DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS health_logs (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                log_type TEXT NOT NULL,
                value TEXT NOT NULL,
                notes TEXT,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_health_logs_child_timestamp
            ON health_logs(child_id, timestamp DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS driving_reports (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                trip_start INTEGER NOT NULL,
                trip_end INTEGER,
                start_location TEXT NOT NULL,
                end_location TEXT NOT NULL,
                score INTEGER NOT NULL CHECK (score >= 0 AND score <= 100),
                distance_miles REAL NOT NULL,
                max_speed_mph REAL NOT NULL,
                hard_braking INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_driving_reports_child_trip_start
            ON driving_reports(child_id, trip_start DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                due_date INTEGER NOT NULL,
                child_id TEXT,
                category TEXT NOT NULL,
                priority TEXT NOT NULL,
                recurrence TEXT,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE SET NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tasks_family_due
            ON tasks(family_id, due_date);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_created() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .expect("Failed to list tables");

        for expected in [
            "check_ins",
            "children",
            "containment_states",
            "driving_reports",
            "geofence_alerts",
            "health_logs",
            "location_samples",
            "locations",
            "tasks",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_schema_setup_is_repeatable() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        DbConnection::setup_schema(db.pool()).await.expect("Second setup should be a no-op");
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", dir.path().join("family.db").display());

        let db = DbConnection::new(&url, 2).await.expect("Failed to open file database");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM children")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query children");
        assert_eq!(count, 0);
    }
}
