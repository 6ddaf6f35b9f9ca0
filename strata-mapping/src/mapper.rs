use crate::error::MappingError;
use crate::registry::MappingRegistry;
use crate::resolver::StorageClassResolver;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use strata_core::{AttrPath, AttrValue, BackendError, Record, StorageClass};

/// A domain-side expression: one attribute of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainExpr {
    pub domain_name: String,
    pub domain_attr: String,
}

impl DomainExpr {
    pub fn new(domain_name: impl Into<String>, domain_attr: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            domain_attr: domain_attr.into(),
        }
    }
}

/// Options for [`Mapper::to_storage`].
#[derive(Debug, Default, Clone)]
pub struct ToStorageOptions {
    /// Storage attribute names to omit (e.g. drop the identity field on
    /// create).
    pub exclude: HashSet<String>,
}

impl ToStorageOptions {
    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Façade over a [`MappingRegistry`] and an external
/// [`StorageClassResolver`]: bidirectional conversion, table/column
/// resolution, and existence checks.
///
/// The mapper performs no validation of its own; every resolution failure
/// propagates as the registry's [`MappingError`].
#[derive(Clone)]
pub struct Mapper {
    registry: Arc<MappingRegistry>,
    resolver: Arc<dyn StorageClassResolver>,
}

impl Mapper {
    pub fn new(registry: Arc<MappingRegistry>, resolver: Arc<dyn StorageClassResolver>) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// The live storage-class handle backing `(name, attr)`.
    pub fn db_class(&self, name: &str, attr: &str) -> Result<Arc<dyn StorageClass>, MappingError> {
        self.registry.db_class(name, attr, self.resolver.as_ref())
    }

    /// `(table, column)` for a domain expression. Fails for unmapped
    /// expressions and for computed-only entries (no storage column).
    pub fn db_table_column(&self, expr: &DomainExpr) -> Result<(String, String), MappingError> {
        let column = self.storage_column(expr)?;
        let class = self.db_class(&expr.domain_name, &expr.domain_attr)?;
        Ok((class.table_name().to_string(), column))
    }

    /// The storage column mapped to a domain expression, without touching
    /// the backend resolver. Fails for unmapped expressions and for
    /// computed-only entries.
    pub fn storage_column(&self, expr: &DomainExpr) -> Result<String, MappingError> {
        let entry = self.registry.find(&expr.domain_name, &expr.domain_attr)?;
        entry
            .storage_attr()
            .map(str::to_string)
            .ok_or_else(|| {
                MappingError::definition(format!(
                    "attribute '{}' of entity '{}' is computed-only and has no storage column",
                    expr.domain_attr, expr.domain_name
                ))
            })
    }

    /// `"table.column"` for a domain expression.
    pub fn qualified_db_column(&self, expr: &DomainExpr) -> Result<String, MappingError> {
        let (table, column) = self.db_table_column(expr)?;
        Ok(format!("{table}.{column}"))
    }

    /// Convert a domain entity value into a raw storage record.
    ///
    /// Iterates the entity's registered attributes in registration order;
    /// skip-flagged entries and excluded storage attributes are omitted.
    /// The written value is the entry's computed producer when present,
    /// else the entity's current value at the domain attribute path
    /// (attributes missing on the entity are omitted, not errors). Dotted
    /// storage attributes nest into the record.
    pub fn to_storage(
        &self,
        domain_name: &str,
        entity: &AttrValue,
        options: &ToStorageOptions,
    ) -> Result<Record, MappingError> {
        let mut record = Record::new();
        for (_, entry) in self.registry.entity_attrs(domain_name)? {
            if entry.is_skip() {
                continue;
            }
            let target = entry.storage_target();
            if options.exclude.contains(&target) {
                continue;
            }
            let value = match entry.computed_attr() {
                Some(producer) => Some(producer()),
                None => entry.domain_attr().read(entity).cloned(),
            };
            if let Some(value) = value {
                let target = AttrPath::parse(&target)
                    .map_err(|err| MappingError::definition(format!("storage_attr: {err}")))?;
                target.write(&mut record, value);
            }
        }
        Ok(record)
    }

    /// Convert a raw storage record into a nested map of domain-attribute
    /// values, ready for entity construction. The inverse of
    /// [`to_storage`](Self::to_storage); skip-flagged attributes are read
    /// back, computed-only entries are not.
    pub fn to_entity(&self, domain_name: &str, record: &Record) -> Result<AttrValue, MappingError> {
        let mut entity = Record::new();
        for (_, entry) in self.registry.entity_attrs(domain_name)? {
            let Some(storage_attr) = entry.storage_attr() else {
                continue;
            };
            let source = AttrPath::parse(storage_attr)
                .map_err(|err| MappingError::definition(format!("storage_attr: {err}")))?;
            if let Some(value) = source.read_map(record) {
                entry.domain_attr().write(&mut entity, value.clone());
            }
        }
        Ok(AttrValue::Object(entity))
    }

    /// True iff the backing storage class holds a record with the mapped
    /// column equal to `value`.
    pub fn exists(&self, expr: &DomainExpr, value: &AttrValue) -> Result<bool, ExistsError> {
        let (_, column) = self.db_table_column(expr)?;
        let class = self.db_class(&expr.domain_name, &expr.domain_attr)?;
        Ok(class.exists(&column, value)?)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("entities", &self.registry.entity_names().count())
            .finish()
    }
}

/// Failure of an existence check: either the mapping could not be resolved
/// or the backend probe failed.
#[derive(Debug)]
pub enum ExistsError {
    Mapping(MappingError),
    Backend(BackendError),
}

impl fmt::Display for ExistsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExistsError::Mapping(err) => write!(f, "{err}"),
            ExistsError::Backend(err) => write!(f, "existence check failed: {err}"),
        }
    }
}

impl std::error::Error for ExistsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExistsError::Mapping(err) => Some(err),
            ExistsError::Backend(err) => Some(err),
        }
    }
}

impl From<MappingError> for ExistsError {
    fn from(err: MappingError) -> Self {
        ExistsError::Mapping(err)
    }
}

impl From<BackendError> for ExistsError {
    fn from(err: BackendError) -> Self {
        ExistsError::Backend(err)
    }
}
