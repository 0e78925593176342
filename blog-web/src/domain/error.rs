use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Post not found")]
    PostNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound | Self::PostNotFound => 404,
            Self::UserAlreadyExists => 409,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::ValidationError(_) => 400,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<tera::Error> for DomainError {
    fn from(err: tera::Error) -> Self {
        Self::InternalError(format!("Template rendering failed: {}", err))
    }
}
