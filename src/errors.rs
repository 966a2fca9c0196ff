use crate::domain::DomainError;
use thiserror::Error;

/// Machine-readable error category reported alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Code string exposed to API clients.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Conflict { message: String },

    /// Transition or business-rule violation. Carries no kind.
    #[error("{0}")]
    Domain(DomainError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// `"<entity> not found"`.
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound {
            message: format!("{entity} not found"),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Category for the API layer; `None` for bare domain rule violations.
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotFound { .. } => Some(ErrorKind::NotFound),
            Self::Validation { .. } => Some(ErrorKind::Validation),
            Self::Conflict { .. } => Some(ErrorKind::Conflict),
            Self::Domain(_) => None,
            Self::Database(_) | Self::Config { .. } | Self::Io(_) => Some(ErrorKind::Internal),
        }
    }
}

// Factory invariants surface as validation failures; transition rules stay domain errors.
impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        if err.is_validation() {
            Self::Validation {
                message: err.to_string(),
            }
        } else {
            Self::Domain(err)
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_split_by_kind() {
        let invalid: Error = DomainError::Invalid("Quantity must be greater than 0".into()).into();
        assert_eq!(invalid.kind(), Some(ErrorKind::Validation));

        let stock: Error = DomainError::InsufficientStock {
            requested: 3,
            available: 1,
        }
        .into();
        assert_eq!(stock.to_string(), "Insufficient stock. Available: 1");
        assert_eq!(stock.kind(), Some(ErrorKind::Validation));

        let rule: Error = DomainError::Rule("Cannot confirm completed order".into()).into();
        assert_eq!(rule.kind(), None);
        assert!(matches!(rule, Error::Domain(_)));
    }

    #[test]
    fn test_constructors_and_codes() {
        let err = Error::not_found("Cart");
        assert_eq!(err.to_string(), "Cart not found");
        assert_eq!(err.kind().map(ErrorKind::code), Some("NOT_FOUND"));
        assert_eq!(
            Error::conflict("dup").kind().map(ErrorKind::code),
            Some("CONFLICT")
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".into()))
                .kind()
                .map(ErrorKind::code),
            Some("INTERNAL_ERROR")
        );
    }
}
