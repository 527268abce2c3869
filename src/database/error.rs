use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        {
            return Self::UniqueViolation(err);
        }
        Self::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn non_database_errors_pass_through_as_sqlx() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
