//! Tool invocation audit log.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::models::ToolAuditEntry;
use crate::Result;

/// Stored tool output is cut to this many characters.
pub const MAX_AUDIT_CONTENT_CHARS: usize = 2000;

/// Record one tool invocation.
pub async fn insert_audit(
    pool: &SqlitePool,
    sender_id: &str,
    tool_name: &str,
    arguments: &str,
    success: bool,
    content: &str,
) -> Result<()> {
    let content: String = content.chars().take(MAX_AUDIT_CONTENT_CHARS).collect();

    sqlx::query(
        r#"
        INSERT INTO tool_audit (sender_id, tool_name, arguments, success, content)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(sender_id)
    .bind(tool_name)
    .bind(arguments)
    .bind(success)
    .bind(content)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get recent audit entries, newest first, optionally for one sender.
pub async fn list_audit(
    pool: &SqlitePool,
    sender_id: Option<&str>,
    limit: i64,
) -> Result<Vec<ToolAuditEntry>> {
    let rows = sqlx::query_as::<_, ToolAuditEntry>(
        r#"
        SELECT id, sender_id, tool_name, arguments, success, content, created_at
        FROM tool_audit
        WHERE ?1 IS NULL OR sender_id = ?1
        ORDER BY id DESC
        LIMIT ?2
        "#,
    )
    .bind(sender_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Prune audit entries older than the specified TTL.
pub async fn prune_older_than(pool: &SqlitePool, ttl: Duration) -> Result<u64> {
    let modifier = format!("-{} seconds", ttl.as_secs());
    let result = sqlx::query(
        r#"
        DELETE FROM tool_audit
        WHERE created_at < datetime('now', ?)
        "#,
    )
    .bind(modifier)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Prune the audit log to a maximum row count, keeping the newest rows.
pub async fn prune_over_limit(pool: &SqlitePool, max_rows: usize) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM tool_audit
        WHERE id NOT IN (
            SELECT id
            FROM tool_audit
            ORDER BY id DESC
            LIMIT ?
        )
        "#,
    )
    .bind(max_rows as i64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
