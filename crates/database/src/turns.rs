//! Conversation turn persistence.

use sqlx::SqlitePool;

use crate::models::ConversationTurn;
use crate::Result;

/// Append a turn to a sender's history.
pub async fn insert_turn(pool: &SqlitePool, sender_id: &str, role: &str, content: &str) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO conversation_turns (sender_id, role, content)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(sender_id)
    .bind(role)
    .bind(content)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get the most recent `limit` turns for a sender, oldest first.
pub async fn recent_turns(
    pool: &SqlitePool,
    sender_id: &str,
    limit: i64,
) -> Result<Vec<ConversationTurn>> {
    let rows = sqlx::query_as::<_, ConversationTurn>(
        r#"
        SELECT id, sender_id, role, content, created_at
        FROM (
            SELECT id, sender_id, role, content, created_at
            FROM conversation_turns
            WHERE sender_id = ?
            ORDER BY id DESC
            LIMIT ?
        )
        ORDER BY id ASC
        "#,
    )
    .bind(sender_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete every turn for a sender. Returns the number of rows removed.
pub async fn clear_turns(pool: &SqlitePool, sender_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM conversation_turns
        WHERE sender_id = ?
        "#,
    )
    .bind(sender_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Count stored turns for a sender.
pub async fn count_turns(pool: &SqlitePool, sender_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM conversation_turns
        WHERE sender_id = ?
        "#,
    )
    .bind(sender_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
