use anyhow::Result;
use shared::Child;
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

/// Repository for child operations
#[derive(Clone)]
pub struct ChildRepository {
    db: DbConnection,
}

impl ChildRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a child in the database
    pub async fn store_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO children (id, family_id, name, birthdate, allergies, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&child.id)
        .bind(&child.family_id)
        .bind(&child.name)
        .bind(&child.birthdate)
        .bind(serde_json::to_string(&child.allergies)?)
        .bind(&child.notes)
        .bind(to_millis(&child.created_at))
        .bind(to_millis(&child.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a child by ID
    pub async fn get_child(&self, child_id: &str) -> Result<Option<Child>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, name, birthdate, allergies, notes, created_at, updated_at
            FROM children
            WHERE id = ?
            "#,
        )
        .bind(child_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_child).transpose()
    }

    /// List a family's children ordered by name
    pub async fn list_children(&self, family_id: &str) -> Result<Vec<Child>> {
        let rows = sqlx::query(
            r#"
            SELECT id, family_id, name, birthdate, allergies, notes, created_at, updated_at
            FROM children
            WHERE family_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_child).collect()
    }

    /// Update a child in the database
    pub async fn update_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE children
            SET name = ?, birthdate = ?, allergies = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&child.name)
        .bind(&child.birthdate)
        .bind(serde_json::to_string(&child.allergies)?)
        .bind(&child.notes)
        .bind(to_millis(&child.updated_at))
        .bind(&child.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a child; returns false when no such child existed
    pub async fn delete_child(&self, child_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM children WHERE id = ?")
            .bind(child_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_child(row: &SqliteRow) -> Result<Child> {
    let allergies: String = row.try_get("allergies")?;
    Ok(Child {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        name: row.try_get("name")?,
        birthdate: row.try_get("birthdate")?,
        allergies: serde_json::from_str(&allergies)?,
        notes: row.try_get("notes")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::time::now;

    fn child(id: &str, family_id: &str, name: &str) -> Child {
        let ts = now();
        Child {
            id: id.to_string(),
            family_id: family_id.to_string(),
            name: name.to_string(),
            birthdate: "2015-06-15".to_string(),
            allergies: vec!["peanuts".to_string()],
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_child() {
        let repo = ChildRepository::new(DbConnection::init_test().await.unwrap());
        let alice = child("child::alice", "family::1", "Alice");

        repo.store_child(&alice).await.unwrap();

        let loaded = repo.get_child("child::alice").await.unwrap();
        assert_eq!(loaded, Some(alice));
        assert_eq!(repo.get_child("child::nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_children_is_scoped_and_ordered() {
        let repo = ChildRepository::new(DbConnection::init_test().await.unwrap());
        repo.store_child(&child("child::b", "family::1", "Bob")).await.unwrap();
        repo.store_child(&child("child::a", "family::1", "Alice")).await.unwrap();
        repo.store_child(&child("child::c", "family::2", "Carol")).await.unwrap();

        let names: Vec<String> = repo
            .list_children("family::1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_delete_child_reports_missing() {
        let repo = ChildRepository::new(DbConnection::init_test().await.unwrap());
        repo.store_child(&child("child::a", "family::1", "Alice")).await.unwrap();

        assert!(repo.delete_child("child::a").await.unwrap());
        assert!(!repo.delete_child("child::a").await.unwrap());
    }
}
