use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{AppointmentConfig, AvailabilityDay, Business, VisualConfig};

use super::is_unique_violation;

/// Subdomain slug syntax: lowercase ASCII letters, digits, hyphens; 3-50
/// chars. Checked before any uniqueness probe.
pub fn is_valid_slug(slug: &str) -> bool {
    (3..=50).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[derive(Debug, thiserror::Error)]
pub enum BusinessError {
    #[error("Subdomain already taken")]
    SlugTaken,
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct NewBusiness {
    pub name: String,
    pub description: Option<String>,
    pub subdomain: String,
    pub visual_config: Option<VisualConfig>,
    pub appointment_config: AppointmentConfig,
    pub availability: Option<Vec<AvailabilityDay>>,
}

pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub async fn new() -> Result<Self, BusinessError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Claim a slug for an owner. The public availability probe races with
    /// concurrent registrants, so correctness lives in the unique constraint:
    /// the second writer gets 23505 and observes `SlugTaken`.
    pub async fn create(&self, owner_id: i64, new: NewBusiness) -> Result<Business, BusinessError> {
        sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses
                (user_id, name, description, subdomain,
                 visual_config, appointment_config, availability)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.subdomain)
        .bind(new.visual_config.map(Json))
        .bind(Json(new.appointment_config))
        .bind(new.availability.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BusinessError::SlugTaken
            } else {
                BusinessError::Database(e)
            }
        })
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, BusinessError> {
        let rows = sqlx::query_as::<_, Business>(
            "SELECT * FROM businesses WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Business>, BusinessError> {
        let row = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_subdomain(&self, slug: &str) -> Result<Option<Business>, BusinessError> {
        let row = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE subdomain = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// UX probe for the onboarding wizard. Never the correctness guarantee.
    pub async fn subdomain_taken(&self, slug: &str) -> Result<bool, BusinessError> {
        let (taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM businesses WHERE subdomain = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    /// Does this user own at least one business? One of the two facts the
    /// onboarding state is derived from.
    pub async fn owner_has_any(&self, owner_id: i64) -> Result<bool, BusinessError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM businesses WHERE user_id = $1)")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Write back a merged row. Callers load the row (which also proves
    /// ownership), apply partial changes in memory, then persist the result.
    pub async fn update(&self, business: &Business) -> Result<Business, BusinessError> {
        sqlx::query_as::<_, Business>(
            r#"
            UPDATE businesses
            SET name = $2,
                description = $3,
                subdomain = $4,
                visual_config = $5,
                appointment_config = $6,
                availability = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(business.id)
        .bind(&business.name)
        .bind(&business.description)
        .bind(&business.subdomain)
        .bind(&business.visual_config)
        .bind(&business.appointment_config)
        .bind(&business.availability)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BusinessError::SlugTaken
            } else {
                BusinessError::Database(e)
            }
        })
    }

    /// Appointments go with it via the cascading foreign key.
    pub async fn delete(&self, id: i64) -> Result<u64, BusinessError> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
