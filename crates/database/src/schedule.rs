//! Scheduled prompt CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewScheduledPrompt, ScheduledPrompt};
use crate::validation::{
    normalize_cron, parse_schedule, require_text, MAX_NAME_LENGTH, MAX_TEXT_LENGTH,
};

/// Validate a scheduled prompt and return its normalized expression.
fn validate(prompt: &NewScheduledPrompt) -> Result<String> {
    require_text("name", &prompt.name, MAX_NAME_LENGTH)?;
    require_text("prompt", &prompt.prompt, MAX_TEXT_LENGTH)?;
    parse_schedule(&prompt.schedule)?;
    Ok(normalize_cron(&prompt.schedule))
}

/// Create a new scheduled prompt.
pub async fn create(pool: &SqlitePool, prompt: &NewScheduledPrompt) -> Result<ScheduledPrompt> {
    let schedule = validate(prompt)?;
    let name = prompt.name.trim();

    let result = sqlx::query(
        r#"
        INSERT INTO scheduled_prompts (name, schedule, prompt, enabled)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(&schedule)
    .bind(&prompt.prompt)
    .bind(prompt.enabled)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Scheduled prompt", name))?;

    get(pool, result.last_insert_rowid()).await
}

/// Get a scheduled prompt by id.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<ScheduledPrompt> {
    sqlx::query_as::<_, ScheduledPrompt>(
        r#"
        SELECT id, name, schedule, prompt, enabled, created_at, updated_at
        FROM scheduled_prompts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Scheduled prompt",
        id: id.to_string(),
    })
}

/// Replace a scheduled prompt's fields.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    prompt: &NewScheduledPrompt,
) -> Result<ScheduledPrompt> {
    let schedule = validate(prompt)?;
    let name = prompt.name.trim();

    let result = sqlx::query(
        r#"
        UPDATE scheduled_prompts
        SET name = ?, schedule = ?, prompt = ?, enabled = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(&schedule)
    .bind(&prompt.prompt)
    .bind(prompt.enabled)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Scheduled prompt", name))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Scheduled prompt",
            id: id.to_string(),
        });
    }

    get(pool, id).await
}

/// Delete a scheduled prompt by id.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM scheduled_prompts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Scheduled prompt",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all scheduled prompts.
pub async fn list(pool: &SqlitePool) -> Result<Vec<ScheduledPrompt>> {
    let prompts = sqlx::query_as::<_, ScheduledPrompt>(
        r#"
        SELECT id, name, schedule, prompt, enabled, created_at, updated_at
        FROM scheduled_prompts
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(prompts)
}

/// List enabled scheduled prompts.
pub async fn list_enabled(pool: &SqlitePool) -> Result<Vec<ScheduledPrompt>> {
    let prompts = sqlx::query_as::<_, ScheduledPrompt>(
        r#"
        SELECT id, name, schedule, prompt, enabled, created_at, updated_at
        FROM scheduled_prompts
        WHERE enabled = 1
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(prompts)
}
