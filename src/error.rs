use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("Account error: {0}")]
    Account(String),
}

pub type AppResult<T> = Result<T, AppError>;
