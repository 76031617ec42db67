use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::rbac::Role;

/// User record in the database. The hash and reset fields never leave the
/// process in JSON; `reset_token`/`reset_token_expires` are either both set
/// (an active reset flow) or both NULL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, role,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, role,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_reset_token(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, role,
                   reset_token, reset_token_expires, created_at
            FROM users
            WHERE reset_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        hashed_password: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, hashed_password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, hashed_password, role,
                      reset_token, reset_token_expires, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Store a fresh reset token, overwriting any outstanding one. At most
    /// one reset token per user is ever active.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET reset_token = $1, reset_token_expires = $2 WHERE id = $3")
            .bind(token)
            .bind(expires)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Atomically replace the password and clear the reset fields, but only
    /// if the token still matches and is still within its window. The
    /// compare-and-clear closes the race where two concurrent resets with
    /// the same token could both succeed. Returns the user's email on
    /// success, `None` if the token no longer qualifies.
    pub async fn consume_reset_token(
        db: &PgPool,
        token: &str,
        new_hashed_password: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET hashed_password = $1, reset_token = NULL, reset_token_expires = NULL
            WHERE reset_token = $2 AND reset_token_expires > $3
            RETURNING email
            "#,
        )
        .bind(new_hashed_password)
        .bind(token)
        .bind(now)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|(email,)| email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_fields_never_serialize() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            hashed_password: "$argon2id$v=19$secret".into(),
            role: Role::Technician,
            reset_token: Some("tok".into()),
            reset_token_expires: Some(OffsetDateTime::now_utc()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("\"technician\""));
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("reset_token"));
    }
}
