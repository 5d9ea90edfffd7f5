use diesel::result::DatabaseErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("schema error: {0}")]
    Schema(String),
}

impl From<diesel::result::Error> for DatabaseError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::NotNullViolation
                    | DatabaseErrorKind::CheckViolation
                    | DatabaseErrorKind::UniqueViolation => DatabaseError::Constraint(message),
                    _ => DatabaseError::Query(message),
                }
            }
            other => DatabaseError::Query(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_violation_maps_to_constraint() {
        let err = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("FOREIGN KEY constraint failed".to_string()),
        );
        assert!(matches!(
            DatabaseError::from(err),
            DatabaseError::Constraint(_)
        ));
    }

    #[test]
    fn not_found_maps_to_query_error() {
        let err = diesel::result::Error::NotFound;
        assert!(matches!(DatabaseError::from(err), DatabaseError::Query(_)));
    }
}
