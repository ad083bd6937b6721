//! Keyword rule CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{KeywordRule, NewKeywordRule};
use crate::validation::{require_text, ValidationError, MAX_NAME_LENGTH, MAX_TEXT_LENGTH};

/// Split a pattern into its normalized alternatives.
///
/// Alternatives are trimmed and lowercased; blank ones are dropped.
pub fn alternatives(pattern: &str) -> Vec<String> {
    pattern
        .split(',')
        .map(|alt| alt.trim().to_lowercase())
        .filter(|alt| !alt.is_empty())
        .collect()
}

/// Create a new keyword rule.
pub async fn create(pool: &SqlitePool, rule: &NewKeywordRule) -> Result<KeywordRule> {
    validate(pool, rule, None).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO keyword_rules (pattern, kind, payload, enabled)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(rule.pattern.trim())
    .bind(rule.kind)
    .bind(&rule.payload)
    .bind(rule.enabled)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Keyword rule", rule.pattern.trim()))?;

    get(pool, result.last_insert_rowid()).await
}

/// Get a keyword rule by id.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<KeywordRule> {
    sqlx::query_as::<_, KeywordRule>(
        r#"
        SELECT id, pattern, kind, payload, enabled, created_at, updated_at
        FROM keyword_rules
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Keyword rule",
        id: id.to_string(),
    })
}

/// Replace a keyword rule's fields.
pub async fn update(pool: &SqlitePool, id: i64, rule: &NewKeywordRule) -> Result<KeywordRule> {
    validate(pool, rule, Some(id)).await?;

    let result = sqlx::query(
        r#"
        UPDATE keyword_rules
        SET pattern = ?, kind = ?, payload = ?, enabled = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(rule.pattern.trim())
    .bind(rule.kind)
    .bind(&rule.payload)
    .bind(rule.enabled)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Keyword rule", rule.pattern.trim()))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Keyword rule",
            id: id.to_string(),
        });
    }

    get(pool, id).await
}

/// Delete a keyword rule by id.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM keyword_rules
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Keyword rule",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all keyword rules.
pub async fn list(pool: &SqlitePool) -> Result<Vec<KeywordRule>> {
    let rules = sqlx::query_as::<_, KeywordRule>(
        r#"
        SELECT id, pattern, kind, payload, enabled, created_at, updated_at
        FROM keyword_rules
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// List enabled keyword rules.
pub async fn list_enabled(pool: &SqlitePool) -> Result<Vec<KeywordRule>> {
    let rules = sqlx::query_as::<_, KeywordRule>(
        r#"
        SELECT id, pattern, kind, payload, enabled, created_at, updated_at
        FROM keyword_rules
        WHERE enabled = 1
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// Reject blank fields and alternatives already claimed by another rule.
async fn validate(pool: &SqlitePool, rule: &NewKeywordRule, own_id: Option<i64>) -> Result<()> {
    require_text("pattern", &rule.pattern, MAX_NAME_LENGTH)?;
    require_text("payload", &rule.payload, MAX_TEXT_LENGTH)?;

    let wanted = alternatives(&rule.pattern);
    if wanted.is_empty() {
        return Err(ValidationError::Empty("pattern".to_string()).into());
    }

    for existing in list(pool).await? {
        if Some(existing.id) == own_id {
            continue;
        }
        let taken = alternatives(&existing.pattern);
        if let Some(dup) = wanted.iter().find(|alt| taken.contains(alt)) {
            return Err(ValidationError::DuplicateKeyword(dup.clone()).into());
        }
    }

    Ok(())
}
