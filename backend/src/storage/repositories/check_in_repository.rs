use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{CheckIn, CheckInView};
use sqlx::Row;

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

/// Repository for the append-only check-in log
#[derive(Clone)]
pub struct CheckInRepository {
    db: DbConnection,
}

impl CheckInRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_check_in(&self, check_in: &CheckIn) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO check_ins (id, location_id, child_id, timestamp, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&check_in.id)
        .bind(&check_in.location_id)
        .bind(&check_in.child_id)
        .bind(to_millis(&check_in.timestamp))
        .bind(&check_in.notes)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Most recent check-ins at a family's locations, newest first
    pub async fn list_recent(&self, family_id: &str, limit: u32) -> Result<Vec<CheckInView>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.location_id, c.child_id, c.timestamp, c.notes,
                   l.name AS location_name, ch.name AS child_name
            FROM check_ins c
            JOIN locations l ON l.id = c.location_id
            LEFT JOIN children ch ON ch.id = c.child_id
            WHERE l.family_id = ?
            ORDER BY c.timestamp DESC, c.id DESC
            LIMIT ?
            "#,
        )
        .bind(family_id)
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CheckInView {
                    check_in: CheckIn {
                        id: row.try_get("id")?,
                        location_id: row.try_get("location_id")?,
                        child_id: row.try_get("child_id")?,
                        timestamp: from_millis(row.try_get("timestamp")?)?,
                        notes: row.try_get("notes")?,
                    },
                    location_name: row.try_get("location_name")?,
                    child_name: row.try_get("child_name")?,
                })
            })
            .collect()
    }

    /// Count a child's check-ins with `after < timestamp <= until`
    pub async fn count_for_child(
        &self,
        child_id: &str,
        after: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM check_ins
            WHERE child_id = ? AND timestamp > ? AND timestamp <= ?
            "#,
        )
        .bind(child_id)
        .bind(to_millis(after))
        .bind(to_millis(until))
        .fetch_one(self.db.pool())
        .await?;

        Ok(u32::try_from(count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::time::now;
    use crate::storage::{ChildRepository, LocationRepository};
    use chrono::Duration;
    use shared::{Child, Location, LocationCategory};

    async fn setup() -> CheckInRepository {
        let db = DbConnection::init_test().await.unwrap();
        let ts = now();
        ChildRepository::new(db.clone())
            .store_child(&Child {
                id: "child::1".to_string(),
                family_id: "family::1".to_string(),
                name: "Alice".to_string(),
                birthdate: "2015-06-15".to_string(),
                allergies: vec![],
                notes: None,
                created_at: ts,
                updated_at: ts,
            })
            .await
            .unwrap();
        LocationRepository::new(db.clone())
            .store_location(&Location {
                id: "location::park".to_string(),
                family_id: "family::1".to_string(),
                name: "Park".to_string(),
                address: None,
                category: LocationCategory::Activity,
                latitude: 40.0,
                longitude: -74.0,
                geofence_enabled: false,
                geofence_radius_m: None,
                created_at: ts,
                updated_at: ts,
            })
            .await
            .unwrap();
        CheckInRepository::new(db)
    }

    fn check_in(id: &str, child_id: Option<&str>, timestamp: DateTime<Utc>) -> CheckIn {
        CheckIn {
            id: id.to_string(),
            location_id: "location::park".to_string(),
            child_id: child_id.map(str::to_string),
            timestamp,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_list_recent_joins_names_newest_first() {
        let repo = setup().await;
        let ts = now();
        repo.store_check_in(&check_in("checkin::old", Some("child::1"), ts - Duration::hours(2)))
            .await
            .unwrap();
        repo.store_check_in(&check_in("checkin::new", None, ts)).await.unwrap();

        let recent = repo.list_recent("family::1", 20).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].check_in.id, "checkin::new");
        assert_eq!(recent[0].child_name, None);
        assert_eq!(recent[1].location_name, "Park");
        assert_eq!(recent[1].child_name.as_deref(), Some("Alice"));

        assert_eq!(repo.list_recent("family::1", 1).await.unwrap().len(), 1);
        assert!(repo.list_recent("family::2", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_for_child_excludes_window_start() {
        let repo = setup().await;
        let end = now();
        let start = end - Duration::days(7);
        repo.store_check_in(&check_in("checkin::start", Some("child::1"), start)).await.unwrap();
        repo.store_check_in(&check_in("checkin::mid", Some("child::1"), end - Duration::days(3)))
            .await
            .unwrap();
        repo.store_check_in(&check_in("checkin::end", Some("child::1"), end)).await.unwrap();

        assert_eq!(repo.count_for_child("child::1", &start, &end).await.unwrap(), 2);
    }
}
