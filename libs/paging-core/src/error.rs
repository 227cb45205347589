use thiserror::Error;

/// Boxed provider failure; the original error stays reachable through `source()`.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for page building.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("field '{field}' was not found on type '{type_name}'")]
    FieldNotFound { field: String, type_name: String },

    #[error("ordering on type '{type_name}' cannot be pushed into the query provider")]
    OrderNotTranslatable { type_name: String },

    #[error("operation was cancelled")]
    Cancelled,

    #[error("query provider failed: {0}")]
    Provider(#[source] ProviderError),

    #[error("invalid paging configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub fn field_not_found(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Wrap a provider failure without altering it.
    pub fn provider<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider(Box::new(err))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
