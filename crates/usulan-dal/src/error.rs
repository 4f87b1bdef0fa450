pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Unique value already taken: {0}")]
    UniqueViolation(String),
}

impl Error {
    /// Translates a UNIQUE index violation into a typed error, so a
    /// create/update race on isbn surfaces as a conflict instead of a
    /// generic database failure.
    pub(crate) fn from_db(field: &str, e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Error::UniqueViolation(field.to_string());
            }
        }
        Error::DatabaseError(e)
    }
}
