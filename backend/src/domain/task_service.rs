//! # Task Service
//!
//! Family task CRUD plus the due-state classifier. Due state is derived on
//! every read from the completion flag and the due date:
//!
//! - completed tasks are `Completed` whatever their due date
//! - otherwise `due_date <= now` is `Overdue`
//! - otherwise `Upcoming`

use chrono::{DateTime, Utc};
use log::{info, warn};
use shared::{
    ClassifiedTask, CreateTaskRequest, Task, TaskBoard, TaskDueState, TaskResponse, UpdateTaskRequest,
};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{generate_id, validate_family_id};
use crate::storage::time::{now, truncate_to_millis};
use crate::storage::{ChildRepository, DbConnection, TaskRepository};

const MAX_TITLE_LEN: usize = 200;

pub fn classify(task: &Task, now: &DateTime<Utc>) -> TaskDueState {
    if task.completed {
        TaskDueState::Completed
    } else if task.due_date <= *now {
        TaskDueState::Overdue
    } else {
        TaskDueState::Upcoming
    }
}

pub fn classify_task(task: Task, now: &DateTime<Utc>) -> ClassifiedTask {
    let due_state = classify(&task, now);
    ClassifiedTask { task, due_state }
}

/// Group tasks into overdue (oldest due first), upcoming (soonest first) and
/// completed (most recently updated first)
pub fn build_board(tasks: Vec<Task>, now: &DateTime<Utc>) -> TaskBoard {
    let mut board = TaskBoard::default();
    for task in tasks {
        let classified = classify_task(task, now);
        match classified.due_state {
            TaskDueState::Overdue => board.overdue.push(classified),
            TaskDueState::Upcoming => board.upcoming.push(classified),
            TaskDueState::Completed => board.completed.push(classified),
        }
    }

    board.overdue.sort_by(|a, b| a.task.due_date.cmp(&b.task.due_date));
    board.upcoming.sort_by(|a, b| a.task.due_date.cmp(&b.task.due_date));
    board.completed.sort_by(|a, b| b.task.updated_at.cmp(&a.task.updated_at));
    board
}

#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    children: ChildRepository,
}

impl TaskService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            tasks: TaskRepository::new(db.clone()),
            children: ChildRepository::new(db),
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> DomainResult<TaskResponse> {
        info!("Creating task: title={}, family={}", request.title, request.family_id);

        validate_family_id(&request.family_id)?;
        let title = validate_title(&request.title)?;
        self.validate_assignee(&request.family_id, request.child_id.as_deref()).await?;

        let ts = now();
        let task = Task {
            id: generate_id("task"),
            family_id: request.family_id,
            title,
            description: request.description,
            due_date: truncate_to_millis(request.due_date),
            child_id: request.child_id,
            category: request.category,
            priority: request.priority,
            recurrence: request.recurrence,
            completed: false,
            created_at: ts,
            updated_at: ts,
        };

        self.tasks.store_task(&task).await?;
        info!("Created task {} ({})", task.title, task.id);

        Ok(TaskResponse {
            task: classify_task(task, &ts),
            success_message: "Task created successfully".to_string(),
        })
    }

    async fn require_task(&self, task_id: &str) -> DomainResult<Task> {
        self.tasks.get_task(task_id).await?.ok_or_else(|| {
            warn!("Task not found: {}", task_id);
            DomainError::not_found("Task", task_id)
        })
    }

    pub async fn update_task(&self, task_id: &str, request: UpdateTaskRequest) -> DomainResult<TaskResponse> {
        info!("Updating task: {}", task_id);

        let mut task = self.require_task(task_id).await?;

        if let Some(title) = request.title {
            task.title = validate_title(&title)?;
        }
        if let Some(child_id) = request.child_id {
            self.validate_assignee(&task.family_id, Some(&child_id)).await?;
            task.child_id = Some(child_id);
        }
        if let Some(description) = request.description {
            task.description = Some(description);
        }
        if let Some(due_date) = request.due_date {
            task.due_date = truncate_to_millis(due_date);
        }
        if let Some(category) = request.category {
            task.category = category;
        }
        if let Some(priority) = request.priority {
            task.priority = priority;
        }
        if let Some(recurrence) = request.recurrence {
            task.recurrence = Some(recurrence);
        }

        let ts = now();
        task.updated_at = ts;
        self.tasks.update_task(&task).await?;

        info!("Updated task {} ({})", task.title, task.id);
        Ok(TaskResponse {
            task: classify_task(task, &ts),
            success_message: "Task updated successfully".to_string(),
        })
    }

    /// Flip a task's completion flag
    pub async fn toggle_task(&self, task_id: &str) -> DomainResult<TaskResponse> {
        info!("Toggling task: {}", task_id);

        let mut task = self.require_task(task_id).await?;
        let ts = now();
        task.completed = !task.completed;
        task.updated_at = ts;
        self.tasks.update_task(&task).await?;

        info!("Task {} is now {}", task.id, if task.completed { "completed" } else { "open" });
        Ok(TaskResponse {
            task: classify_task(task, &ts),
            success_message: "Task toggled successfully".to_string(),
        })
    }

    pub async fn delete_task(&self, task_id: &str) -> DomainResult<()> {
        info!("Deleting task: {}", task_id);

        if !self.tasks.delete_task(task_id).await? {
            warn!("Task not found: {}", task_id);
            return Err(DomainError::not_found("Task", task_id));
        }

        info!("Deleted task {}", task_id);
        Ok(())
    }

    /// All of a family's tasks grouped by derived due state
    pub async fn task_board(&self, family_id: &str) -> DomainResult<TaskBoard> {
        info!("Building task board for family {}", family_id);
        validate_family_id(family_id)?;

        let tasks = self.tasks.list_tasks(family_id).await?;
        let board = build_board(tasks, &now());

        info!(
            "Task board for {}: {} overdue, {} upcoming, {} completed",
            family_id,
            board.overdue.len(),
            board.upcoming.len(),
            board.completed.len()
        );
        Ok(board)
    }

    /// An assigned child must exist and belong to the task's family
    async fn validate_assignee(&self, family_id: &str, child_id: Option<&str>) -> DomainResult<()> {
        let Some(child_id) = child_id else {
            return Ok(());
        };
        let child = self
            .children
            .get_child(child_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Child", child_id))?;
        if child.family_id != family_id {
            return Err(DomainError::validation(format!(
                "Child {} does not belong to family {}",
                child_id, family_id
            )));
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("Task title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "Task title cannot exceed {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}
