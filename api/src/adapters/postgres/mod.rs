//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod attendance_repo;
pub mod bill_repo;
pub mod cart_repo;
pub mod order_repo;
pub mod organization_repo;
pub mod product_repo;
mod stock;
pub mod user_repo;


pub use attendance_repo::PostgresAttendanceRepository;
pub use bill_repo::PostgresBillRepository;
pub use cart_repo::PostgresCartRepository;
pub use order_repo::PostgresOrderRepository;
pub use organization_repo::PostgresOrganizationRepository;
pub use product_repo::PostgresProductRepository;
pub use user_repo::PostgresUserRepository;

/// Map an update failure, treating a missing row as `NotFound`
fn update_error(e: sea_orm::DbErr, what: String) -> crate::error::DomainError {
    use crate::error::DomainError;
    match e {
        sea_orm::DbErr::RecordNotUpdated | sea_orm::DbErr::RecordNotFound(_) => {
            DomainError::NotFound(format!("{} not found", what))
        }
        e => DomainError::Database(e.to_string()),
    }
}

/// Commit on success, roll back on error
async fn finish<T>(
    txn: sea_orm::DatabaseTransaction,
    result: Result<T, crate::error::DomainError>,
) -> Result<T, crate::error::DomainError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::warn!(error = %rollback, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}
