use std::collections::HashMap;
use std::sync::Arc;
use strata_core::StorageClass;

/// External type-registry lookup: resolves a fully qualified storage-class
/// identifier (`"billing.invoice_table"`) to a live backend handle.
///
/// Supplied by the surrounding application (bootstrap container, backend
/// crate); the mapping layer only consumes it. A `None` return surfaces as
/// [`MappingError::Unresolved`](crate::MappingError::Unresolved).
pub trait StorageClassResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Option<Arc<dyn StorageClass>>;
}

/// A fixed table of storage classes, for bootstrap code and tests.
#[derive(Default)]
pub struct StaticResolver {
    classes: HashMap<String, Arc<dyn StorageClass>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, class: Arc<dyn StorageClass>) -> Self {
        self.classes.insert(reference.into(), class);
        self
    }
}

impl StorageClassResolver for StaticResolver {
    fn resolve(&self, reference: &str) -> Option<Arc<dyn StorageClass>> {
        self.classes.get(reference).cloned()
    }
}
