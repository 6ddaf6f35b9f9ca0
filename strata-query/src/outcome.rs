use crate::collection::EntityCollection;
use std::fmt;
use strata_core::AttrValue;

/// The result of executing a [`Criteria`](crate::Criteria).
///
/// Empty-result outcomes ([`NotFound`](Self::NotFound),
/// [`EmptyDataset`](Self::EmptyDataset)) are ordinary values, not errors:
/// callers inspect the variant.
#[derive(Debug)]
pub enum QueryOutcome {
    /// A (lazily materialized) paginated collection.
    Collection(EntityCollection),
    /// The single requested entity.
    Entity(AttrValue),
    /// Null object for "single result requested, nothing matched".
    NotFound(EntityNotFound),
    /// The criteria demanded an error on an empty dataset.
    EmptyDataset(EmptyDataset),
    /// The verbatim result of an exec-mode operation.
    Raw(AttrValue),
}

impl QueryOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryOutcome::NotFound(_))
    }

    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, QueryOutcome::EmptyDataset(_))
    }

    pub fn as_collection(&self) -> Option<&EntityCollection> {
        match self {
            QueryOutcome::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&AttrValue> {
        match self {
            QueryOutcome::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&AttrValue> {
        match self {
            QueryOutcome::Raw(value) => Some(value),
            _ => None,
        }
    }
}

/// Null-object placeholder: a single result was requested and the relation
/// was empty. Carries the entity name it stands in for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNotFound {
    domain_name: String,
}

impl EntityNotFound {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }
}

impl fmt::Display for EntityNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity not found: {}", self.domain_name)
    }
}

/// The criteria demanded an error on an empty dataset; keyed by the domain
/// name that came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyDataset {
    domain_name: String,
}

impl EmptyDataset {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }
}

impl fmt::Display for EmptyDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "empty dataset for entity '{}'", self.domain_name)
    }
}
