use crate::error::{AppError, ConstraintParser, ViolationInfo};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// This converter handles Diesel database errors and transforms them into
/// appropriate AppError variants with structured information extracted from
/// constraint violation messages.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let violation = ViolationInfo {
            message: info.message(),
            details: info.details(),
            table: info.table_name(),
            constraint: info.constraint_name(),
        };

        let parsed = match kind {
            DatabaseErrorKind::UniqueViolation => ConstraintParser::parse_unique_violation(
                &violation,
            )
            .map(|(entity, field, value)| AppError::Duplicate {
                entity,
                field,
                value,
            }),
            DatabaseErrorKind::NotNullViolation => {
                ConstraintParser::parse_not_null_violation(&violation).map(|(entity, field)| {
                    AppError::Validation {
                        field,
                        reason: format!("Field is required for {}", entity),
                    }
                })
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                ConstraintParser::parse_foreign_key_violation(&violation).map(
                    |(entity, field, value)| AppError::Validation {
                        field,
                        reason: format!("Invalid reference from {} with value '{}'", entity, value),
                    },
                )
            }
            DatabaseErrorKind::CheckViolation => ConstraintParser::parse_check_violation(
                &violation,
            )
            .map(|(entity, field)| AppError::Validation {
                field,
                reason: format!("Check constraint failed for {} field", entity),
            }),
            _ => None,
        };

        parsed.unwrap_or_else(|| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{:?}: {}", kind, violation.message)),
        })
    }
}
