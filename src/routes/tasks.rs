use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskPatch, TaskQuery, TaskReplace},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Column list shared by every task query so RETURNING/SELECT shapes stay in
/// sync with the `Task` struct.
const TASK_COLUMNS: &str =
    "id, user_id, title, description, is_completed, due_date, priority, created_at, updated_at";

/// Retrieves the authenticated user's tasks.
///
/// Supports filtering by completion status (`status=completed|pending`), a
/// `search` term matched against title and description, exact `priority`, and
/// exact `due_date`. Unrecognized or malformed filter values are ignored
/// rather than rejected. Tasks are ordered newest-created first.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let completion = query_params.completion();
    let priority = query_params.priority_filter();
    let due_date = query_params.due_date_filter();

    // Base query scoped to the owner; filter conditions are appended
    // dynamically with their placeholder numbers.
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    let mut conditions: Vec<String> = Vec::new();

    if completion.is_some() {
        conditions.push(format!("is_completed = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        // Case-insensitive substring match across title and description.
        conditions.push(format!(
            "(title ILIKE ${} OR description ILIKE ${})",
            param_count,
            param_count + 1
        ));
        param_count += 2;
    }
    if priority.is_some() {
        conditions.push(format!("priority = ${}", param_count));
        param_count += 1;
    }
    if due_date.is_some() {
        conditions.push(format!("due_date = ${}", param_count));
    }

    if !conditions.is_empty() {
        sql.push_str(" AND ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(user.id);

    if let Some(completed) = completion {
        query_builder = query_builder.bind(completed);
    }
    if let Some(search) = &query_params.search {
        let search_pattern = format!("%{}%", search);
        query_builder = query_builder.bind(search_pattern.clone());
        query_builder = query_builder.bind(search_pattern);
    }
    if let Some(priority) = priority {
        query_builder = query_builder.bind(priority);
    }
    if let Some(due_date) = due_date {
        query_builder = query_builder.bind(due_date);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// Title is required and non-empty; priority defaults to medium and the
/// completion flag to false.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, user_id, title, description, due_date, priority)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.due_date)
    .bind(task_data.priority.unwrap_or_default())
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": task,
    })))
}

/// Retrieves a single task by id.
///
/// The lookup always filters by owner as well as id, so a task belonging to
/// another user is indistinguishable from one that does not exist.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Replaces a task (full update).
///
/// All fields are required except description and due date, which reset to
/// null when absent. Ownership is enforced in the WHERE clause of the single
/// UPDATE statement, so the check and the mutation cannot disagree.
#[put("/{id}")]
pub async fn replace_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskReplace>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, due_date = $3, priority = $4,
             is_completed = $5, updated_at = NOW()
         WHERE id = $6 AND user_id = $7
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.due_date)
    .bind(task_data.priority)
    .bind(task_data.is_completed)
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "message": "Task updated successfully",
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Partially updates a task.
///
/// Only supplied fields change; absent fields are left untouched via
/// COALESCE. An empty body is legal and only bumps the update timestamp.
#[patch("/{id}")]
pub async fn patch_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             due_date = COALESCE($3, due_date),
             priority = COALESCE($4, priority),
             is_completed = COALESCE($5, is_completed),
             updated_at = NOW()
         WHERE id = $6 AND user_id = $7
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.due_date)
    .bind(task_data.priority)
    .bind(task_data.is_completed)
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "message": "Task updated successfully",
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Flips a task's completion flag.
///
/// The response message reflects the new state.
#[patch("/{id}/toggle")]
pub async fn toggle_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET is_completed = NOT is_completed, updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => {
            let message = if task.is_completed {
                "Task marked as completed"
            } else {
                "Task marked as pending"
            };
            Ok(HttpResponse::Ok().json(json!({
                "message": message,
                "task": task,
            })))
        }
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task.
///
/// Repeating the delete reports not-found, not success: the ownership-scoped
/// DELETE affects zero rows the second time.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use crate::models::{TaskInput, TaskPatch, TaskPriority};
    use validator::Validate;

    #[test]
    fn test_task_input_validation() {
        let invalid_input_empty_title = TaskInput {
            title: "".to_string(),
            description: Some("Test Description".to_string()),
            due_date: None,
            priority: Some(TaskPriority::High),
        };
        assert!(
            invalid_input_empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let valid_input = TaskInput {
            title: "Valid Title".to_string(),
            description: None,
            due_date: None,
            priority: None,
        };
        assert!(
            valid_input.validate().is_ok(),
            "Validation should pass for valid input."
        );
    }

    #[test]
    fn test_patch_accepts_empty_body() {
        let patch = TaskPatch::default();
        assert!(patch.validate().is_ok());
    }
}
