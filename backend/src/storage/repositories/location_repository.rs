use anyhow::Result;
use shared::Location;
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

const LOCATION_COLUMNS: &str = "id, family_id, name, address, category, latitude, longitude, \
     geofence_enabled, geofence_radius_m, created_at, updated_at";

/// Repository for family locations
#[derive(Clone)]
pub struct LocationRepository {
    db: DbConnection,
}

impl LocationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_location(&self, location: &Location) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO locations (id, family_id, name, address, category, latitude, longitude,
                                   geofence_enabled, geofence_radius_m, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&location.id)
        .bind(&location.family_id)
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.category.to_string())
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.geofence_enabled)
        .bind(location.geofence_radius_m)
        .bind(to_millis(&location.created_at))
        .bind(to_millis(&location.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_location(&self, location_id: &str) -> Result<Option<Location>> {
        let sql = format!("SELECT {} FROM locations WHERE id = ?", LOCATION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(location_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(row_to_location).transpose()
    }

    /// List a family's locations ordered by name
    pub async fn list_locations(&self, family_id: &str) -> Result<Vec<Location>> {
        let sql = format!(
            "SELECT {} FROM locations WHERE family_id = ? ORDER BY name ASC, id ASC",
            LOCATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_location).collect()
    }

    /// List only the locations of a family that have geofencing switched on
    pub async fn list_geofenced_locations(&self, family_id: &str) -> Result<Vec<Location>> {
        let sql = format!(
            "SELECT {} FROM locations WHERE family_id = ? AND geofence_enabled = TRUE ORDER BY id ASC",
            LOCATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_location).collect()
    }

    /// Update a location. With `reset_containment` the stored containment
    /// state of every child for this location is dropped in the same
    /// transaction, so the next sample re-initializes it.
    pub async fn update_location(&self, location: &Location, reset_containment: bool) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE locations
            SET name = ?, address = ?, category = ?, latitude = ?, longitude = ?,
                geofence_enabled = ?, geofence_radius_m = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.category.to_string())
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.geofence_enabled)
        .bind(location.geofence_radius_m)
        .bind(to_millis(&location.updated_at))
        .bind(&location.id)
        .execute(&mut *tx)
        .await?;

        if reset_containment {
            sqlx::query("DELETE FROM containment_states WHERE location_id = ?")
                .bind(&location.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a location together with its check-ins, alerts and containment
    /// state (cascaded by the schema). Returns false when it did not exist.
    pub async fn delete_location(&self, location_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(location_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_location(row: &SqliteRow) -> Result<Location> {
    let category: String = row.try_get("category")?;
    Ok(Location {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        category: category.parse()?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        geofence_enabled: row.try_get("geofence_enabled")?,
        geofence_radius_m: row.try_get("geofence_radius_m")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}
