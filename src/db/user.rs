use super::{StoreError, UserStore};
use crate::models;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_admin, is_verified, refresh_token";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<models::User, StoreError> {
        let query_span = tracing::info_span!("Fetching the user by ID");
        sqlx::query_as::<_, models::User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)
    }

    async fn find_by_email(&self, email: &str) -> Result<models::User, StoreError> {
        let query_span = tracing::info_span!("Fetching the user by email");
        sqlx::query_as::<_, models::User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)
    }

    async fn upsert_unverified(&self, user: &models::User) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Saving new registration into the database");
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_admin, is_verified, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, FALSE, NULL, NOW() at time zone 'utc', NOW() at time zone 'utc')
            ON CONFLICT (email) DO UPDATE
            SET
                id = EXCLUDED.id,
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash,
                refresh_token = NULL,
                updated_at = NOW() at time zone 'utc'
            WHERE users.is_verified = FALSE
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .instrument(query_span)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "verified account {} already exists",
                user.email
            )));
        }

        tracing::info!("User {} has been saved to the database", user.id);
        Ok(())
    }

    async fn set_refresh_token(&self, id: &Uuid, token: &str) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Replacing the refresh token");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                refresh_token = $1,
                updated_at = NOW() at time zone 'utc'
            WHERE id = $2
            "#,
        )
        .bind(token)
        .bind(id)
        .execute(&self.pool)
        .instrument(query_span)
        .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn mark_verified(&self, email: &str) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Marking the email as verified");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                is_verified = TRUE,
                updated_at = NOW() at time zone 'utc'
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .instrument(query_span)
        .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn set_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Updating the password hash");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                password_hash = $1,
                updated_at = NOW() at time zone 'utc'
            WHERE email = $2
            "#,
        )
        .bind(password_hash)
        .bind(email)
        .execute(&self.pool)
        .instrument(query_span)
        .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<models::User>, StoreError> {
        let query_span = tracing::info_span!("Listing users");
        sqlx::query_as::<_, models::User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Deleting the user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span)
            .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}
