pub mod appointment;
pub mod business;
pub mod user;

pub use appointment::{AppointmentError, AppointmentRepository};
pub use business::{is_valid_slug, BusinessError, BusinessRepository, NewBusiness};
pub use user::{UserError, UserRepository};

/// Postgres unique_violation, the storage-level guarantee behind every
/// check-then-insert path (email, subdomain slug).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Postgres foreign_key_violation. Inserting under a parent deleted after
/// the handler's existence check lands here.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}
