//! Device mapping CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{DeviceMapping, NewDeviceMapping};
use crate::validation::{require_text, validate_entity_id, MAX_NAME_LENGTH};

fn validate(mapping: &NewDeviceMapping) -> Result<()> {
    validate_entity_id(&mapping.entity_id)?;
    require_text("nickname", &mapping.nickname, MAX_NAME_LENGTH)?;
    Ok(())
}

/// Create a new device mapping.
pub async fn create(pool: &SqlitePool, mapping: &NewDeviceMapping) -> Result<DeviceMapping> {
    validate(mapping)?;
    let nickname = mapping.nickname.trim();

    let result = sqlx::query(
        r#"
        INSERT INTO device_mappings (entity_id, nickname, location, category)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(mapping.entity_id.trim())
    .bind(nickname)
    .bind(mapping.location.trim())
    .bind(mapping.category.trim())
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Device mapping", nickname))?;

    get(pool, result.last_insert_rowid()).await
}

/// Get a device mapping by id.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<DeviceMapping> {
    sqlx::query_as::<_, DeviceMapping>(
        r#"
        SELECT id, entity_id, nickname, location, category, created_at
        FROM device_mappings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Device mapping",
        id: id.to_string(),
    })
}

/// Replace a device mapping's fields.
pub async fn update(pool: &SqlitePool, id: i64, mapping: &NewDeviceMapping) -> Result<DeviceMapping> {
    validate(mapping)?;
    let nickname = mapping.nickname.trim();

    let result = sqlx::query(
        r#"
        UPDATE device_mappings
        SET entity_id = ?, nickname = ?, location = ?, category = ?
        WHERE id = ?
        "#,
    )
    .bind(mapping.entity_id.trim())
    .bind(nickname)
    .bind(mapping.location.trim())
    .bind(mapping.category.trim())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Device mapping", nickname))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Device mapping",
            id: id.to_string(),
        });
    }

    get(pool, id).await
}

/// Delete a device mapping by id.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM device_mappings
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Device mapping",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all device mappings, grouped by location.
pub async fn list(pool: &SqlitePool) -> Result<Vec<DeviceMapping>> {
    let mappings = sqlx::query_as::<_, DeviceMapping>(
        r#"
        SELECT id, entity_id, nickname, location, category, created_at
        FROM device_mappings
        ORDER BY location, nickname
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(mappings)
}
