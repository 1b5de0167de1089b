//! Todo data models.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{TodoError, TodoResult};
use crate::auth::UserId;

/// Todo ID type
pub type TodoId = Uuid;

/// Progress of a todo item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status text that is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown todo status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TodoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TodoStatus::Pending),
            "in_progress" => Ok(TodoStatus::InProgress),
            "completed" => Ok(TodoStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Todo model
///
/// Always owned by exactly one user. A non-null `archived_at` hides the item
/// from listings without removing the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TodoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Overwrite only the fields present in `patch`.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
    }
}

/// Fields accepted when creating a todo. Status always starts as pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn validate(&self) -> TodoResult<()> {
        validate_title(&self.title)
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TodoStatus>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }

    pub fn validate(&self) -> TodoResult<()> {
        if self.is_empty() {
            return Err(TodoError::Validation("No fields to update".to_string()));
        }
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> TodoResult<()> {
    if title.trim().is_empty() {
        return Err(TodoError::Validation("Title is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> Todo {
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "buy milk".to_string(),
            description: Some("2 litres".to_string()),
            status: TodoStatus::Pending,
            due_date: None,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TodoStatus::InProgress).unwrap(),
            "in_progress"
        );
        let parsed: TodoStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TodoStatus::Completed);
        assert!(serde_json::from_str::<TodoStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_status_from_str_matches_as_str() {
        for status in [
            TodoStatus::Pending,
            TodoStatus::InProgress,
            TodoStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TodoStatus>().unwrap(), status);
        }
        assert_eq!(
            "archived".parse::<TodoStatus>(),
            Err(UnknownStatus("archived".to_string()))
        );
    }

    #[test]
    fn test_apply_is_partial() {
        let mut item = todo();
        item.apply(TodoPatch {
            status: Some(TodoStatus::Completed),
            ..Default::default()
        });

        assert_eq!(item.title, "buy milk");
        assert_eq!(item.description.as_deref(), Some("2 litres"));
        assert_eq!(item.status, TodoStatus::Completed);
    }

    #[test]
    fn test_new_todo_requires_title() {
        let blank = NewTodo {
            title: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(blank.validate(), Err(TodoError::Validation(_))));

        let ok = NewTodo {
            title: "buy milk".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(matches!(
            TodoPatch::default().validate(),
            Err(TodoError::Validation(_))
        ));

        let blank_title = TodoPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            blank_title.validate(),
            Err(TodoError::Validation(_))
        ));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut item = todo();
        item.description = None;
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("description").is_none());
        assert!(json.get("due_date").is_none());
        assert!(json.get("archived_at").is_none());
        assert_eq!(json["status"], "pending");
    }
}
