use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;

pub type EstateResult<T> = Result<T, EstateError>;

#[derive(Debug, Error)]
pub enum EstateError {
    #[error("{0}")]
    InvalidStateTransition(String),
    #[error("The offer price {price} is not higher than the best offer {best_price}")]
    OfferTooLow { price: f64, best_price: f64 },
    #[error("{0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EstateError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        EstateError::NotFound { entity, id }
    }

    /// Stable identifier sent to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            EstateError::InvalidStateTransition(_) => "invalid_state_transition",
            EstateError::OfferTooLow { .. } => "offer_too_low",
            EstateError::Validation(_) => "validation_error",
            EstateError::NotFound { .. } => "not_found",
            EstateError::Database(_)
            | EstateError::Pool(_)
            | EstateError::Migration(_)
            | EstateError::Task(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EstateError::InvalidStateTransition(_)
            | EstateError::OfferTooLow { .. }
            | EstateError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EstateError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DieselError> for EstateError {
    fn from(err: DieselError) -> Self {
        if let DieselError::DatabaseError(kind, info) = &err {
            if is_constraint_violation(kind, info.message()) {
                return EstateError::Validation(constraint_message(info.message()));
            }
        }
        EstateError::Database(err)
    }
}

fn is_constraint_violation(kind: &DatabaseErrorKind, message: &str) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::ForeignKeyViolation
    ) || message.contains("constraint failed")
}

/// Turns a raw SQLite constraint message into the text shown to users.
fn constraint_message(raw: &str) -> String {
    const KNOWN: &[(&str, &str)] = &[
        ("check_expected_price", "Expected price must be strictly positive"),
        ("check_selling_price", "Selling price must be positive"),
        ("check_offer_price", "Offer price must be positive"),
        ("properties.name", "Property name must be unique"),
        ("property_tags.name", "Tag name must be unique"),
        ("users.login", "User login must be unique"),
        ("FOREIGN KEY", "Referenced record does not exist"),
    ];
    KNOWN
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map(|(_, message)| (*message).to_string())
        .unwrap_or_else(|| raw.to_string())
}

impl IntoResponse for EstateError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_readable_messages() {
        assert_eq!(
            constraint_message("CHECK constraint failed: check_expected_price"),
            "Expected price must be strictly positive"
        );
        assert_eq!(
            constraint_message("UNIQUE constraint failed: property_tags.name"),
            "Tag name must be unique"
        );
        assert_eq!(constraint_message("something odd"), "something odd");
    }

    #[test]
    fn user_errors_are_unprocessable() {
        let err = EstateError::OfferTooLow { price: 10.0, best_price: 20.0 };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "offer_too_low");
        assert_eq!(EstateError::not_found("property", 3).status(), StatusCode::NOT_FOUND);
    }
}
