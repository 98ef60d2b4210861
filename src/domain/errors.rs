use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Order is not eligible for review")]
    NotEligible,
    #[error("Order has already been reviewed")]
    AlreadyReviewed,
    #[error("Internal error: {0}")]
    Internal(String),
}
