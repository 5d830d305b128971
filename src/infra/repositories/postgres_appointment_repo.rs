use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use crate::domain::{
    models::appointment::{Appointment, AppointmentChanges, NewAppointment},
    ports::AppointmentRepository,
};
use crate::error::AppError;

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepo {
    async fn list(&self) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT id, customer_id, datetime, session_number, notes FROM appointments ORDER BY datetime ASC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_customers(&self, customer_ids: &[String]) -> Result<Vec<Appointment>, AppError> {
        if customer_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Appointment>(
            "SELECT id, customer_id, datetime, session_number, notes FROM appointments WHERE customer_id = ANY($1)"
        )
            .bind(customer_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"INSERT INTO appointments (id, customer_id, datetime, session_number, notes)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, customer_id, datetime, session_number, notes"#
        )
            .bind(Uuid::new_v4().to_string())
            .bind(&appointment.customer_id)
            .bind(appointment.datetime)
            .bind(appointment.session_number)
            .bind(&appointment.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, id: &str, changes: &AppointmentChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }
        let result = sqlx::query(
            r#"UPDATE appointments
               SET datetime = COALESCE($1, datetime),
                   session_number = COALESCE($2, session_number),
                   notes = COALESCE($3, notes)
               WHERE id = $4"#
        )
            .bind(changes.datetime)
            .bind(changes.session_number)
            .bind(&changes.notes)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }
        Ok(())
    }

    async fn delete_by_customer(&self, customer_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM appointments WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
