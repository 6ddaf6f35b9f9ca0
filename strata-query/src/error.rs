use std::sync::Arc;
use strata_mapping::MappingError;

/// Errors raised while executing a [`Criteria`](crate::Criteria).
///
/// `Clone` on purpose: a failed deferred collection load is cached by the
/// collection (the backend is never re-queried), so the same error may be
/// handed to several readers.
#[derive(Debug, Clone)]
pub enum QueryError {
    /// The repository lacks the expected `"<name>_query"` capability.
    MissingQueryMethod { capability: String },
    /// The criteria combines options that the engine rejects by contract.
    InvalidCriteria { reason: String },
    /// A mapping lookup failed while translating the criteria.
    Mapping(MappingError),
    /// A failure during where/order/limit/materialization, wrapped with the
    /// domain name and the original failure's type and message. The cause
    /// is preserved through [`source`](std::error::Error::source).
    Execution {
        domain_name: String,
        kind: &'static str,
        message: String,
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl QueryError {
    pub fn missing_query_method(capability: impl Into<String>) -> Self {
        QueryError::MissingQueryMethod {
            capability: capability.into(),
        }
    }

    pub fn invalid_criteria(reason: impl Into<String>) -> Self {
        QueryError::InvalidCriteria {
            reason: reason.into(),
        }
    }

    /// Wrap a failure raised during query execution, tagged with the domain
    /// name and the original error's type path and message.
    pub fn execution<E>(domain_name: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        QueryError::Execution {
            domain_name: domain_name.into(),
            kind: std::any::type_name::<E>(),
            message: source.to_string(),
            source: Arc::new(source),
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::MissingQueryMethod { capability } => {
                write!(f, "repository does not expose query capability '{capability}'")
            }
            QueryError::InvalidCriteria { reason } => {
                write!(f, "invalid criteria: {reason}")
            }
            QueryError::Mapping(err) => write!(f, "{err}"),
            QueryError::Execution {
                domain_name,
                kind,
                message,
                ..
            } => {
                write!(f, "query for '{domain_name}' failed ({kind}): {message}")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Execution { source, .. } => Some(source.as_ref()),
            QueryError::Mapping(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MappingError> for QueryError {
    fn from(err: MappingError) -> Self {
        QueryError::Mapping(err)
    }
}
