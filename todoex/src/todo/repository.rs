//! Todo repository trait and implementations.
//!
//! Every operation takes the owner's id and filters on it, so one user can
//! never read or modify another user's rows, whatever id they guess.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    errors::{TodoError, TodoResult},
    models::{NewTodo, Todo, TodoId, TodoPatch, TodoStatus},
};
use crate::auth::UserId;

/// Trait for owned todo persistence.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Active todos of `user_id`, newest first.
    async fn list(&self, user_id: UserId) -> TodoResult<Vec<Todo>>;

    /// Create a pending todo owned by `user_id`.
    async fn create(&self, user_id: UserId, new: NewTodo) -> TodoResult<Todo>;

    /// Apply a partial update and return the updated row.
    ///
    /// # Errors
    ///
    /// * `TodoError::NotFound` - Absent, archived, or owned by another user
    async fn update(&self, user_id: UserId, id: TodoId, patch: TodoPatch) -> TodoResult<Todo>;

    /// Soft-delete a todo.
    ///
    /// # Errors
    ///
    /// * `TodoError::NotFound` - Absent, already archived, or owned by another user
    async fn archive(&self, user_id: UserId, id: TodoId) -> TodoResult<()>;

    /// Fetch a todo owned by `user_id`, archived ones included.
    async fn get(&self, user_id: UserId, id: TodoId) -> TodoResult<Option<Todo>>;
}

const TODO_COLUMNS: &str =
    "id, user_id, title, description, status, due_date, created_at, archived_at";

fn todo_from_row(row: &PgRow) -> TodoResult<Todo> {
    let status: String = row.try_get("status")?;

    Ok(Todo {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: status.parse()?,
        due_date: row.try_get("due_date")?,
        created_at: row.try_get("created_at")?,
        archived_at: row.try_get("archived_at")?,
    })
}

/// Default PostgreSQL implementation of `TodoRepository`
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn list(&self, user_id: UserId) -> TodoResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TODO_COLUMNS} FROM todo
            WHERE user_id = $1 AND archived_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(todo_from_row).collect()
    }

    async fn create(&self, user_id: UserId, new: NewTodo) -> TodoResult<Todo> {
        new.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO todo (id, user_id, title, description, status, due_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(TodoStatus::Pending.as_str())
        .bind(new.due_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        todo_from_row(&row)
    }

    async fn update(&self, user_id: UserId, id: TodoId, patch: TodoPatch) -> TodoResult<Todo> {
        patch.validate()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE todo SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                status = COALESCE($3, status),
                due_date = COALESCE($4, due_date)
            WHERE id = $5 AND user_id = $6 AND archived_at IS NULL
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.status.map(TodoStatus::as_str))
        .bind(patch.due_date)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TodoError::NotFound)?;

        todo_from_row(&row)
    }

    async fn archive(&self, user_id: UserId, id: TodoId) -> TodoResult<()> {
        let result = sqlx::query(
            "UPDATE todo SET archived_at = NOW() WHERE id = $1 AND user_id = $2 AND archived_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, user_id: UserId, id: TodoId) -> TodoResult<Option<Todo>> {
        sqlx::query(&format!(
            "SELECT {TODO_COLUMNS} FROM todo WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(todo_from_row)
        .transpose()
    }
}

/// Todo repository held in process memory.
///
/// Rows are kept in insertion order, so listings stay newest first even when
/// two items share a timestamp.
#[derive(Default)]
pub struct MemoryTodoRepository {
    rows: RwLock<Vec<Todo>>,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn list(&self, user_id: UserId) -> TodoResult<Vec<Todo>> {
        let rows = self.rows.read().await;
        let mut todos: Vec<Todo> = rows
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id && !t.is_archived())
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn create(&self, user_id: UserId, new: NewTodo) -> TodoResult<Todo> {
        new.validate()?;

        let todo = Todo {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            description: new.description,
            status: TodoStatus::Pending,
            due_date: new.due_date,
            created_at: Utc::now(),
            archived_at: None,
        };
        self.rows.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, user_id: UserId, id: TodoId, patch: TodoPatch) -> TodoResult<Todo> {
        patch.validate()?;

        let mut rows = self.rows.write().await;
        let todo = rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id && !t.is_archived())
            .ok_or(TodoError::NotFound)?;
        todo.apply(patch);
        Ok(todo.clone())
    }

    async fn archive(&self, user_id: UserId, id: TodoId) -> TodoResult<()> {
        let mut rows = self.rows.write().await;
        let todo = rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id && !t.is_archived())
            .ok_or(TodoError::NotFound)?;
        todo.archived_at = Some(Utc::now());
        Ok(())
    }

    async fn get(&self, user_id: UserId, id: TodoId) -> TodoResult<Option<Todo>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_sets_pending() {
        let repo = MemoryTodoRepository::new();
        let owner = Uuid::new_v4();

        let todo = repo.create(owner, new_todo("buy milk")).await.unwrap();
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(todo.user_id, owner);
        assert!(todo.archived_at.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let repo = MemoryTodoRepository::new();
        assert!(repo.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_newest_first() {
        let repo = MemoryTodoRepository::new();
        let owner = Uuid::new_v4();
        repo.create(owner, new_todo("first")).await.unwrap();
        repo.create(owner, new_todo("second")).await.unwrap();
        repo.create(owner, new_todo("third")).await.unwrap();

        let titles: Vec<String> = repo
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let repo = MemoryTodoRepository::new();
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let anns = repo.create(ann, new_todo("ann's")).await.unwrap();
        repo.create(bob, new_todo("bob's")).await.unwrap();

        let listed = repo.list(bob).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|t| t.user_id == bob));

        // Bob knows Ann's id but still cannot touch it.
        let patch = TodoPatch {
            title: Some("hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(bob, anns.id, patch).await,
            Err(TodoError::NotFound)
        ));
        assert!(matches!(
            repo.archive(bob, anns.id).await,
            Err(TodoError::NotFound)
        ));
        assert!(repo.get(bob, anns.id).await.unwrap().is_none());

        let untouched = repo.get(ann, anns.id).await.unwrap().unwrap();
        assert_eq!(untouched.title, "ann's");
        assert!(untouched.archived_at.is_none());
    }

    #[tokio::test]
    async fn test_archive_is_soft() {
        let repo = MemoryTodoRepository::new();
        let owner = Uuid::new_v4();
        let todo = repo.create(owner, new_todo("buy milk")).await.unwrap();

        repo.archive(owner, todo.id).await.unwrap();

        assert!(repo.list(owner).await.unwrap().is_empty());
        let stored = repo.get(owner, todo.id).await.unwrap().unwrap();
        assert!(stored.archived_at.is_some());

        // Archived rows can be neither archived again nor updated.
        assert!(matches!(
            repo.archive(owner, todo.id).await,
            Err(TodoError::NotFound)
        ));
        let patch = TodoPatch {
            status: Some(TodoStatus::Completed),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(owner, todo.id, patch).await,
            Err(TodoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_returns_updated_row() {
        let repo = MemoryTodoRepository::new();
        let owner = Uuid::new_v4();
        let todo = repo
            .create(
                owner,
                NewTodo {
                    title: "buy milk".to_string(),
                    description: Some("semi-skimmed".to_string()),
                    due_date: None,
                },
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                owner,
                todo.id,
                TodoPatch {
                    status: Some(TodoStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, TodoStatus::InProgress);
        assert_eq!(updated.title, "buy milk");
        assert_eq!(updated.description.as_deref(), Some("semi-skimmed"));
        assert_eq!(updated.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let repo = MemoryTodoRepository::new();
        assert!(matches!(
            repo.archive(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(TodoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let repo = MemoryTodoRepository::new();
        let owner = Uuid::new_v4();
        assert!(matches!(
            repo.create(owner, new_todo(" ")).await,
            Err(TodoError::Validation(_))
        ));
        assert!(repo.list(owner).await.unwrap().is_empty());
    }
}
