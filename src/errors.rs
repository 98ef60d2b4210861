use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(_) | DomainError::InvalidStatus(_) => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::NotEligible | DomainError::AlreadyReviewed => {
                AppError::Conflict(e.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: &str| serde_json::json!({ "error": msg });
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body(&self.to_string())),
            AppError::Unauthorized => HttpResponse::Unauthorized().json(body(&self.to_string())),
            AppError::NotFound(_) => HttpResponse::NotFound().json(body(&self.to_string())),
            AppError::Conflict(_) => HttpResponse::Conflict().json(body(&self.to_string())),
            AppError::Internal(msg) => {
                log::error!("internal error: {msg}");
                HttpResponse::InternalServerError().json(body("Internal server error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err: AppError = DomainError::Validation("bad cart".to_string()).into();
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad cart");
    }

    #[test]
    fn invalid_status_maps_to_400_with_the_rejected_value() {
        let err: AppError = DomainError::InvalidStatus("Refunded".to_string()).into();
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid status: Refunded");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err: AppError = DomainError::NotFound("Order").into();
        assert_eq!(err.error_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Order not found");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err: AppError = DomainError::Unauthorized.into();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn review_gating_errors_map_to_409() {
        let not_eligible: AppError = DomainError::NotEligible.into();
        assert_eq!(not_eligible.error_response().status(), StatusCode::CONFLICT);

        let reviewed: AppError = DomainError::AlreadyReviewed.into();
        assert_eq!(reviewed.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_maps_to_500_and_hides_the_message() {
        let err: AppError = DomainError::Internal("pool exhausted".to_string()).into();
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
