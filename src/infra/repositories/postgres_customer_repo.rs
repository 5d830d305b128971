use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;
use crate::domain::{
    models::customer::{Customer, CustomerChanges, NewCustomer},
    ports::CustomerRepository,
};
use crate::error::AppError;

pub struct PostgresCustomerRepo {
    pool: PgPool,
}

impl PostgresCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepo {
    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, user_id, price_per_4_sessions, created_at FROM customers ORDER BY created_at DESC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (id, name, user_id, price_per_4_sessions, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING id, name, user_id, price_per_4_sessions, created_at",
        )
            .bind(Uuid::new_v4().to_string())
            .bind(&customer.name)
            .bind(&customer.owner_user_id)
            .bind(customer.price_per_4_sessions)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, id: &str, changes: &CustomerChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        let result = sqlx::query(
            "UPDATE customers SET name = COALESCE($1, name), price_per_4_sessions = COALESCE($2, price_per_4_sessions) WHERE id = $3"
        )
            .bind(&changes.name)
            .bind(changes.price_per_4_sessions)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres Customer Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".into()));
        }
        Ok(())
    }

    /// Ownerless rows stay visible to everyone in hosted mode; nothing to claim.
    async fn claim_unowned(&self, _owner_id: &str) -> Result<usize, AppError> {
        Ok(0)
    }
}
