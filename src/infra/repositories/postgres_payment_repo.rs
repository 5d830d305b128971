use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::domain::{
    models::payment::{NewPayment, Payment, PaymentChanges},
    ports::PaymentRepository,
};
use crate::error::AppError;

const COLUMNS: &str = "id, customer_id, sets, unit_price, amount, date, for_period, note";

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn list(&self) -> Result<Vec<Payment>, AppError> {
        sqlx::query_as::<_, Payment>(&format!("SELECT {} FROM payments ORDER BY date DESC", COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, payment: &NewPayment) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(&format!(
            "INSERT INTO payments ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = COLUMNS
        ))
            .bind(Uuid::new_v4().to_string())
            .bind(&payment.customer_id)
            .bind(payment.sets)
            .bind(payment.unit_price)
            .bind(payment.amount())
            .bind(payment.date)
            .bind(&payment.for_period)
            .bind(&payment.note)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        // amount follows sets/unit_price only when one of them changes; legacy rows keep theirs otherwise
        let result = sqlx::query(
            r#"UPDATE payments
               SET sets = COALESCE($1, sets),
                   unit_price = COALESCE($2, unit_price),
                   amount = CASE WHEN $1 IS NULL AND $2 IS NULL THEN amount
                                 ELSE COALESCE(COALESCE($1, sets) * COALESCE($2, unit_price), amount) END,
                   date = COALESCE($3, date),
                   for_period = COALESCE($4, for_period),
                   note = COALESCE($5, note)
               WHERE id = $6"#
        )
            .bind(changes.sets)
            .bind(changes.unit_price)
            .bind(changes.date)
            .bind(&changes.for_period)
            .bind(&changes.note)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment not found".into()));
        }
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM payments WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
