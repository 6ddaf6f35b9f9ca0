/// Errors raised by the mapping layer.
///
/// These indicate a configuration defect (a missing or malformed mapping
/// declaration); they are never retried or recovered locally.
#[derive(Debug, Clone)]
pub enum MappingError {
    /// A mapping entry failed construction-time validation.
    Definition { reason: String },
    /// The entity (or an attribute of a known entity) has no registered
    /// mapping.
    NotRegistered {
        entity: String,
        attr: Option<String>,
    },
    /// A storage-class reference could not be resolved to a live handle.
    Unresolved { reference: String },
}

impl MappingError {
    pub fn definition(reason: impl Into<String>) -> Self {
        MappingError::Definition {
            reason: reason.into(),
        }
    }

    pub fn entity_not_registered(entity: impl Into<String>) -> Self {
        MappingError::NotRegistered {
            entity: entity.into(),
            attr: None,
        }
    }

    pub fn attr_not_registered(entity: impl Into<String>, attr: impl Into<String>) -> Self {
        MappingError::NotRegistered {
            entity: entity.into(),
            attr: Some(attr.into()),
        }
    }
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingError::Definition { reason } => {
                write!(f, "mapping definition error: {reason}")
            }
            MappingError::NotRegistered { entity, attr: None } => {
                write!(f, "entity '{entity}' is not registered")
            }
            MappingError::NotRegistered {
                entity,
                attr: Some(attr),
            } => {
                write!(f, "attribute '{attr}' of entity '{entity}' is not registered")
            }
            MappingError::Unresolved { reference } => {
                write!(f, "storage class reference '{reference}' cannot be resolved")
            }
        }
    }
}

impl std::error::Error for MappingError {}
