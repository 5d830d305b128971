use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::domain::{
    models::training_record::{NewTrainingRecord, TrainingRecord, TrainingRecordChanges},
    ports::TrainingRecordRepository,
};
use crate::error::AppError;

pub struct PostgresTrainingRecordRepo {
    pool: PgPool,
}

impl PostgresTrainingRecordRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrainingRecordRepository for PostgresTrainingRecordRepo {
    async fn list(&self) -> Result<Vec<TrainingRecord>, AppError> {
        sqlx::query_as::<_, TrainingRecord>(
            "SELECT id, customer_id, date, content FROM training_records ORDER BY date DESC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, record: &NewTrainingRecord) -> Result<TrainingRecord, AppError> {
        sqlx::query_as::<_, TrainingRecord>(
            "INSERT INTO training_records (id, customer_id, date, content) VALUES ($1, $2, $3, $4) RETURNING id, customer_id, date, content"
        )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.customer_id)
            .bind(record.date)
            .bind(&record.content)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, id: &str, changes: &TrainingRecordChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        let result = sqlx::query(
            "UPDATE training_records SET date = COALESCE($1, date), content = COALESCE($2, content) WHERE id = $3"
        )
            .bind(changes.date)
            .bind(&changes.content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Training record not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM training_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Training record not found".into()));
        }
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM training_records WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
