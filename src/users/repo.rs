use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, sqlx::Type)]
#[sqlx(type_name = "user_type")]
pub enum UserType {
    User,
    Admin,
}

/// User record as stored. Serialization to clients goes through
/// `UserResponse`; this struct is storage-only.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hashed: String,
    pub auth_token: Option<String>,
    pub auth_token_expiration: Option<OffsetDateTime>,
    pub registered_on: OffsetDateTime,
    pub email_confirmation_sent_on: OffsetDateTime,
    pub email_confirmed: bool,
    pub email_confirmed_on: Option<OffsetDateTime>,
    pub user_type: UserType,
}

/// A user row joined with the number of journal entries it owns, for the
/// admin listing.
#[derive(Debug, FromRow)]
pub struct UserWithEntryCount {
    #[sqlx(flatten)]
    pub user: User,
    pub entry_count: i64,
}

const USER_COLUMNS: &str = "id, email, password_hashed, auth_token, auth_token_expiration, \
     registered_on, email_confirmation_sent_on, email_confirmed, email_confirmed_on, user_type";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Exact-match lookup by bearer token. Expiry is checked by the
    /// caller; the row is returned as stored.
    pub async fn find_by_auth_token(db: &PgPool, token: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_token = $1"
        ))
        .bind(token)
        .fetch_optional(db)
        .await
    }

    /// Create a user with an already-hashed password. The unique
    /// constraint on email surfaces as a database error for the caller
    /// to translate.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hashed: &str,
        user_type: UserType,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hashed, user_type)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hashed)
        .bind(user_type)
        .fetch_one(db)
        .await
    }

    /// Store a freshly issued bearer token, replacing any prior one.
    pub async fn set_auth_token(
        db: &PgPool,
        id: i64,
        token: &str,
        expiration: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET auth_token = $2, auth_token_expiration = $3 WHERE id = $1")
            .bind(id)
            .bind(token)
            .bind(expiration)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Expire the current token without clearing its value.
    pub async fn revoke_auth_token(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET auth_token_expiration = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_password(db: &PgPool, id: i64, password_hashed: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hashed = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hashed)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn confirm_email(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET email_confirmed = TRUE, email_confirmed_on = now() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn unconfirm_email(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET email_confirmed = FALSE, email_confirmed_on = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Record that a confirmation email was (re)sent.
    pub async fn touch_confirmation_sent(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET email_confirmation_sent_on = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// All users with their entry counts, ordered by id.
    pub async fn list_with_entry_counts(db: &PgPool) -> sqlx::Result<Vec<UserWithEntryCount>> {
        sqlx::query_as::<_, UserWithEntryCount>(
            "SELECT u.*, COUNT(e.id) AS entry_count
             FROM users u
             LEFT JOIN entries e ON e.user_id = u.id
             GROUP BY u.id
             ORDER BY u.id",
        )
        .fetch_all(db)
        .await
    }

    /// Delete the user's entries, then the user, in one transaction so
    /// no orphan entries can outlive a partial failure.
    pub async fn delete_with_entries(db: &PgPool, id: i64) -> sqlx::Result<()> {
        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM entries WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }
}
