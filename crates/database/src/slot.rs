//! Named state slots holding one JSON document each.

use sqlx::SqlitePool;

use crate::models::StoredSlot;
use crate::Result;

/// Get a slot by name.
pub async fn get_slot(pool: &SqlitePool, slot: &str) -> Result<Option<StoredSlot>> {
    let record = sqlx::query_as::<_, StoredSlot>(
        r#"
        SELECT slot, payload, updated_at
        FROM state_slots
        WHERE slot = ?
        "#,
    )
    .bind(slot)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Write several slots in one transaction.
pub async fn upsert_slots(pool: &SqlitePool, slots: &[(&str, &str)]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (slot, payload) in slots {
        sqlx::query(
            r#"
            INSERT INTO state_slots (slot, payload)
            VALUES (?, ?)
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = datetime('now')
            "#,
        )
        .bind(slot)
        .bind(payload)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Delete every slot.
pub async fn clear_all(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM state_slots
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_slot_upsert_and_get() {
        let db = test_db().await;

        upsert_slots(db.pool(), &[("profile", r#"{"name":"Jeffrey"}"#)])
            .await
            .unwrap();
        let stored = get_slot(db.pool(), "profile").await.unwrap().unwrap();
        assert_eq!(stored.slot, "profile");
        assert_eq!(stored.payload, r#"{"name":"Jeffrey"}"#);
        assert!(!stored.updated_at.is_empty());

        upsert_slots(db.pool(), &[("profile", r#"{"name":"Amy"}"#)])
            .await
            .unwrap();
        let stored = get_slot(db.pool(), "profile").await.unwrap().unwrap();
        assert_eq!(stored.payload, r#"{"name":"Amy"}"#);
    }

    #[tokio::test]
    async fn test_missing_slot() {
        let db = test_db().await;
        assert!(get_slot(db.pool(), "plan").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_slots_and_clear_all() {
        let db = test_db().await;

        upsert_slots(
            db.pool(),
            &[("profile", "{}"), ("journal", "[]"), ("plan", "null")],
        )
        .await
        .unwrap();
        for name in ["profile", "journal", "plan"] {
            assert!(get_slot(db.pool(), name).await.unwrap().is_some());
        }
        let plan = get_slot(db.pool(), "plan").await.unwrap().unwrap();
        assert_eq!(plan.payload, "null");

        clear_all(db.pool()).await.unwrap();
        for name in ["profile", "journal", "plan"] {
            assert!(get_slot(db.pool(), name).await.unwrap().is_none());
        }
    }
}
