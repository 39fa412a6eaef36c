use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority. The default for new tasks.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl FromStr for TaskPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(()),
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional free-text description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// Optional due date for the task.
    pub due_date: Option<NaiveDate>,
    /// The priority of the task.
    pub priority: TaskPriority,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Required and non-empty.
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// An optional description for the task.
    pub description: Option<String>,

    /// Optional due date for the task.
    pub due_date: Option<NaiveDate>,

    /// The priority of the task. Defaults to medium when omitted.
    pub priority: Option<TaskPriority>,
}

/// Input structure for a full task replacement (`PUT`). All fields are
/// required except `description` and `due_date`, which reset to null when
/// absent.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskReplace {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub is_completed: bool,
}

/// Input structure for a partial task update (`PATCH`). Only supplied fields
/// change; absent fields are left untouched.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TaskPatch {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<TaskPriority>,
    pub is_completed: Option<bool>,
}

/// Represents query parameters for filtering tasks when listing them.
///
/// Values arrive as raw strings and are parsed leniently: unrecognized status
/// or priority values and unparseable dates are ignored rather than rejected.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct TaskQuery {
    /// Filter by completion: "completed" or "pending". Anything else is ignored.
    pub status: Option<String>,
    /// Search term matched as a substring of title or description.
    pub search: Option<String>,
    /// Filter by exact priority ("low", "medium", "high"). Invalid values are ignored.
    pub priority: Option<String>,
    /// Filter by exact due date (`YYYY-MM-DD`). Invalid dates are dropped.
    pub due_date: Option<String>,
}

impl TaskQuery {
    /// Resolves the `status` filter to a completion flag, if recognized.
    pub fn completion(&self) -> Option<bool> {
        match self.status.as_deref() {
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            _ => None,
        }
    }

    /// Resolves the `priority` filter, ignoring values outside the enum.
    pub fn priority_filter(&self) -> Option<TaskPriority> {
        self.priority.as_deref().and_then(|p| p.parse().ok())
    }

    /// Resolves the `due_date` filter, silently dropping unparseable dates.
    pub fn due_date_filter(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::from_str(d).ok())
    }
}
