use thiserror::Error;

/// Errors surfaced by `ClientDirectory` operations.
///
/// Every variant keeps the storage error it was built from.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Unique constraint violated: {0}")]
    UniqueConstraintViolation(#[source] sqlx::Error),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(#[source] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl DirectoryError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DirectoryError::UniqueConstraintViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DirectoryError::ForeignKeyViolation(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DirectoryError::Connection(_))
    }

    /// The underlying storage error.
    pub fn storage_error(&self) -> &sqlx::Error {
        match self {
            DirectoryError::UniqueConstraintViolation(err)
            | DirectoryError::ForeignKeyViolation(err)
            | DirectoryError::Connection(err)
            | DirectoryError::Database(err) => err,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorClass {
    UniqueViolation,
    ForeignKeyViolation,
    Connection,
    Other,
}

fn classify_sqlstate(code: &str) -> ErrorClass {
    match code {
        "23505" => ErrorClass::UniqueViolation,
        "23503" => ErrorClass::ForeignKeyViolation,
        // invalid authorization, invalid password, unknown database
        "28000" | "28P01" | "3D000" => ErrorClass::Connection,
        c if c.starts_with("08") => ErrorClass::Connection,
        _ => ErrorClass::Other,
    }
}

fn classify(err: &sqlx::Error) -> ErrorClass {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| classify_sqlstate(&code))
            .unwrap_or(ErrorClass::Other),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorClass::Connection,
        _ => ErrorClass::Other,
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        match classify(&err) {
            ErrorClass::UniqueViolation => DirectoryError::UniqueConstraintViolation(err),
            ErrorClass::ForeignKeyViolation => DirectoryError::ForeignKeyViolation(err),
            ErrorClass::Connection => DirectoryError::Connection(err),
            ErrorClass::Other => DirectoryError::Database(err),
        }
    }
}
