use super::{LoanStore, StoreError};
use crate::models;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: Uuid,
    user_id: Uuid,
    description: String,
    amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LoanRow> for models::Loan {
    type Error = StoreError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        Ok(models::Loan {
            id: row.id,
            user_id: row.user_id,
            description: row.description,
            amount: row.amount,
            status: row.status.parse().map_err(StoreError::Storage)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgLoanStore {
    pool: PgPool,
}

impl PgLoanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LoanStore for PgLoanStore {
    async fn insert(&self, loan: &models::Loan) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Saving new loan into the database");
        sqlx::query(
            r#"
            INSERT INTO loans (id, user_id, description, amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(&loan.description)
        .bind(loan.amount)
        .bind(loan.status.as_str())
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .instrument(query_span)
        .await
        .map(|_| {
            tracing::info!("Loan {} has been saved to the database", loan.id);
        })
        .map_err(StoreError::from)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<models::Loan, StoreError> {
        let query_span = tracing::info_span!("Fetching the loan by ID");
        sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT id, user_id, description, amount, status, created_at, updated_at
            FROM loans
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)?
        .try_into()
    }

    async fn list(&self) -> Result<Vec<models::Loan>, StoreError> {
        let query_span = tracing::info_span!("Listing loans");
        sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT id, user_id, description, amount, status, created_at, updated_at
            FROM loans
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)?
        .into_iter()
        .map(models::Loan::try_from)
        .collect()
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: models::LoanStatus,
    ) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Updating the loan status");
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET
                status = $1,
                updated_at = NOW() at time zone 'utc'
            WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .instrument(query_span)
        .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Deleting the loan");
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
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
