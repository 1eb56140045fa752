// sqlx::Error -> AppError mapping

use cctv_core::error::AppError;

/// Convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // SQLite result codes: https://www.sqlite.org/rescode.html
            Some(code @ ("2067" | "1555")) => AppError::Database(format!(
                "Unique constraint violation: {} ({})",
                db_err.message(),
                code
            )),
            Some(code @ ("787" | "3850")) => AppError::Database(format!(
                "Foreign key constraint violation: {} ({})",
                db_err.message(),
                code
            )),
            Some("5") => AppError::Database(format!(
                "Database locked (SQLITE_BUSY): {}",
                db_err.message()
            )),
            Some(code) => AppError::Database(format!(
                "Database error [{}]: {}",
                code,
                db_err.message()
            )),
            None => AppError::Database(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

/// A stored row that no longer decodes into the domain model
pub(crate) fn corrupt_row(id: &str, what: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("Corrupt request row {}: {}", id, what))
}
