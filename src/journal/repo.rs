use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub id: i64,
    pub entry: String,
    pub user_id: i64,
    pub created_on: OffsetDateTime,
    pub last_edited_on: OffsetDateTime,
}

impl Entry {
    /// All entries owned by the user, oldest id first.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Entry>> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, entry, user_id, created_on, last_edited_on
            FROM entries
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: i64, text: &str) -> sqlx::Result<Entry> {
        sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (entry, user_id)
            VALUES ($1, $2)
            RETURNING id, entry, user_id, created_on, last_edited_on
            "#,
        )
        .bind(text)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// Ownership is part of the lookup: an entry belonging to someone
    /// else is indistinguishable from a missing one.
    pub async fn get(db: &PgPool, user_id: i64, id: i64) -> sqlx::Result<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, entry, user_id, created_on, last_edited_on
            FROM entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Replace the text and refresh `last_edited_on`; `created_on` is
    /// never touched after creation.
    pub async fn update(
        db: &PgPool,
        user_id: i64,
        id: i64,
        text: &str,
    ) -> sqlx::Result<Option<Entry>> {
        sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
            SET entry = $3, last_edited_on = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, entry, user_id, created_on, last_edited_on
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(text)
        .fetch_optional(db)
        .await
    }

    /// Hard delete. Returns whether a row was removed.
    pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
