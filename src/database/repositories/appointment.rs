use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Appointment, AppointmentStatus, CustomerData};

use super::is_foreign_key_violation;

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Business not found")]
    BusinessMissing,
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every appointment starts `pending`; the status is a literal here, not a
/// caller choice.
const CREATE_SQL: &str = r#"
    INSERT INTO appointments
        (business_id, customer_data, appointment_time, service_name, status, notes)
    VALUES ($1, $2, $3, $4, 'pending', $5)
    RETURNING *
    "#;

/// The status precondition in the WHERE clause is the whole concurrency
/// story for confirm/cancel: the second writer in a two-tab race matches
/// zero rows, as does a re-issue against a terminal appointment.
const TRANSITION_SQL: &str = r#"
    UPDATE appointments
    SET status = $3, updated_at = NOW()
    WHERE id = $1 AND business_id = $2 AND status = 'pending'
    RETURNING *
    "#;

pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub async fn new() -> Result<Self, AppointmentError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Callers have already verified the business exists, but that check
    /// races with a concurrent delete; the foreign key closes the window and
    /// the violation reports as `BusinessMissing`, not an internal error.
    pub async fn create(
        &self,
        business_id: i64,
        customer: CustomerData,
        appointment_time: DateTime<Utc>,
        service_name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        sqlx::query_as::<_, Appointment>(CREATE_SQL)
            .bind(business_id)
            .bind(Json(customer))
            .bind(appointment_time)
            .bind(service_name)
            .bind(notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppointmentError::BusinessMissing
                } else {
                    AppointmentError::Database(e)
                }
            })
    }

    pub async fn list_for_business(
        &self,
        business_id: i64,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE business_id = $1 ORDER BY appointment_time",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Conditional transition out of `pending`. Zero rows means the caller's
    /// target was already terminal, belongs to another business, or does not
    /// exist; callers report all three as not found.
    pub async fn transition(
        &self,
        appointment_id: i64,
        business_id: i64,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppointmentError> {
        debug_assert!(to.is_terminal());
        let row = sqlx::query_as::<_, Appointment>(TRANSITION_SQL)
            .bind(appointment_id)
            .bind(business_id)
            .bind(to.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_carries_the_pending_precondition() {
        assert!(TRANSITION_SQL.contains("status = 'pending'"));
        assert!(TRANSITION_SQL.contains("business_id = $2"));
        assert!(TRANSITION_SQL.contains("RETURNING *"));
    }

    #[test]
    fn creation_pins_the_initial_status() {
        assert!(CREATE_SQL.contains("'pending'"));
        assert!(!CREATE_SQL.contains("$6"));
    }
}
