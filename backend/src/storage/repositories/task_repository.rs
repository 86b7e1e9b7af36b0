use anyhow::Result;
use shared::Task;
use sqlx::{sqlite::SqliteRow, Row};

use crate::storage::connection::DbConnection;
use crate::storage::time::{from_millis, to_millis};

const TASK_COLUMNS: &str = "id, family_id, title, description, due_date, child_id, category, \
     priority, recurrence, completed, created_at, updated_at";

/// Repository for family tasks. Due state is never stored; it is derived on read.
#[derive(Clone)]
pub struct TaskRepository {
    db: DbConnection,
}

impl TaskRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_task(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, family_id, title, description, due_date, child_id, category,
                               priority, recurrence, completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.family_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(to_millis(&task.due_date))
        .bind(&task.child_id)
        .bind(task.category.to_string())
        .bind(task.priority.to_string())
        .bind(task.recurrence.map(|r| r.to_string()))
        .bind(task.completed)
        .bind(to_millis(&task.created_at))
        .bind(to_millis(&task.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(task_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(row_to_task).transpose()
    }

    /// All of a family's tasks ordered by due date
    pub async fn list_tasks(&self, family_id: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE family_id = ? ORDER BY due_date ASC, id ASC",
            TASK_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_task).collect()
    }

    pub async fn update_task(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, due_date = ?, child_id = ?, category = ?,
                priority = ?, recurrence = ?, completed = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(to_millis(&task.due_date))
        .bind(&task.child_id)
        .bind(task.category.to_string())
        .bind(task.priority.to_string())
        .bind(task.recurrence.map(|r| r.to_string()))
        .bind(task.completed)
        .bind(to_millis(&task.updated_at))
        .bind(&task.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_task(row: &SqliteRow) -> Result<Task> {
    let category: String = row.try_get("category")?;
    let priority: String = row.try_get("priority")?;
    let recurrence: Option<String> = row.try_get("recurrence")?;
    Ok(Task {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        due_date: from_millis(row.try_get("due_date")?)?,
        child_id: row.try_get("child_id")?,
        category: category.parse()?,
        priority: priority.parse()?,
        recurrence: recurrence.map(|r| r.parse()).transpose()?,
        completed: row.try_get("completed")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::time::now;
    use chrono::Duration;
    use shared::{Recurrence, TaskCategory, TaskPriority};

    fn task(id: &str, due_in_hours: i64) -> Task {
        let ts = now();
        Task {
            id: id.to_string(),
            family_id: "family::1".to_string(),
            title: format!("Task {}", id),
            description: None,
            due_date: ts + Duration::hours(due_in_hours),
            child_id: None,
            category: TaskCategory::Medicine,
            priority: TaskPriority::High,
            recurrence: Some(Recurrence::Daily),
            completed: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_store_get_update_task() {
        let repo = TaskRepository::new(DbConnection::init_test().await.unwrap());
        let mut t = task("task::1", 2);
        repo.store_task(&t).await.unwrap();
        assert_eq!(repo.get_task("task::1").await.unwrap(), Some(t.clone()));

        t.completed = true;
        t.recurrence = None;
        repo.update_task(&t).await.unwrap();
        assert_eq!(repo.get_task("task::1").await.unwrap(), Some(t));
    }

    #[tokio::test]
    async fn test_list_orders_by_due_date() {
        let repo = TaskRepository::new(DbConnection::init_test().await.unwrap());
        repo.store_task(&task("task::later", 5)).await.unwrap();
        repo.store_task(&task("task::sooner", 1)).await.unwrap();

        let ids: Vec<String> = repo
            .list_tasks("family::1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["task::sooner", "task::later"]);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let repo = TaskRepository::new(DbConnection::init_test().await.unwrap());
        repo.store_task(&task("task::1", 1)).await.unwrap();
        assert!(repo.delete_task("task::1").await.unwrap());
        assert_eq!(repo.get_task("task::1").await.unwrap(), None);
    }
}
