use crate::entry::MappingEntry;
use crate::error::MappingError;
use crate::resolver::StorageClassResolver;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::StorageClass;

/// Index of [`MappingEntry`] values keyed by `(entity name, domain attribute)`.
///
/// An entity is "known" iff it has at least one registered attribute.
/// Re-registering an existing key overwrites the previous entry
/// (last-write-wins, no error); attribute iteration follows first
/// registration order, and an overwrite keeps the original position.
///
/// The registry is an explicit handle, not an ambient global: it is
/// populated during bootstrap (or test setup) and treated as read-mostly
/// afterwards. Callers that need late concurrent registration wrap it in
/// their own lock. [`snapshot`](Self::snapshot)/[`restore`](Self::restore)
/// give clone-based isolation around test boundaries.
#[derive(Debug, Default, Clone)]
pub struct MappingRegistry {
    entities: HashMap<String, EntityAttrs>,
}

/// Per-entity attribute map, ordered by registration.
#[derive(Debug, Default, Clone)]
struct EntityAttrs {
    attrs: Vec<(String, MappingEntry)>,
}

impl EntityAttrs {
    fn get(&self, attr: &str) -> Option<&MappingEntry> {
        self.attrs
            .iter()
            .find(|(key, _)| key == attr)
            .map(|(_, entry)| entry)
    }

    fn insert(&mut self, attr: String, entry: MappingEntry) -> bool {
        for (key, slot) in &mut self.attrs {
            if *key == attr {
                *slot = entry;
                return true;
            }
        }
        self.attrs.push((attr, entry));
        false
    }
}

/// An immutable copy of a registry's contents, for test isolation.
#[derive(Debug, Clone)]
pub struct MappingSnapshot {
    entities: HashMap<String, EntityAttrs>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every registered entry.
    pub fn reset(&mut self) {
        self.entities.clear();
    }

    /// Insert (or overwrite) `entry` under its `(domain_name, domain_attr)`
    /// key.
    pub fn register(&mut self, entry: MappingEntry) {
        let entity = entry.domain_name().to_string();
        let attr = entry.domain_attr().to_string();
        let overwritten = self
            .entities
            .entry(entity.clone())
            .or_default()
            .insert(attr.clone(), entry);
        if overwritten {
            tracing::debug!(%entity, %attr, "mapping entry overwritten (last-write-wins)");
        }
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn has_entity_attr(&self, name: &str, attr: &str) -> bool {
        self.entities
            .get(name)
            .is_some_and(|attrs| attrs.get(attr).is_some())
    }

    /// The entry registered under `(name, attr)`.
    pub fn find(&self, name: &str, attr: &str) -> Result<&MappingEntry, MappingError> {
        let attrs = self
            .entities
            .get(name)
            .ok_or_else(|| MappingError::entity_not_registered(name))?;
        attrs
            .get(attr)
            .ok_or_else(|| MappingError::attr_not_registered(name, attr))
    }

    /// `(attr, entry)` pairs for a known entity, in registration order.
    pub fn entity_attrs(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = (&str, &MappingEntry)>, MappingError> {
        let attrs = self
            .entities
            .get(name)
            .ok_or_else(|| MappingError::entity_not_registered(name))?;
        Ok(attrs.attrs.iter().map(|(attr, entry)| (attr.as_str(), entry)))
    }

    /// True iff some entry for `name` has `storage_attr == column`.
    pub fn column_mapped(&self, name: &str, column: &str) -> Result<bool, MappingError> {
        Ok(self
            .entity_attrs(name)?
            .any(|(_, entry)| entry.storage_attr() == Some(column)))
    }

    /// Resolve the entry's storage-class reference into a live handle.
    pub fn db_class(
        &self,
        name: &str,
        attr: &str,
        resolver: &dyn StorageClassResolver,
    ) -> Result<Arc<dyn StorageClass>, MappingError> {
        let entry = self.find(name, attr)?;
        let reference = entry.primary_storage_ref();
        resolver
            .resolve(reference)
            .ok_or_else(|| MappingError::Unresolved {
                reference: reference.to_string(),
            })
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn snapshot(&self) -> MappingSnapshot {
        MappingSnapshot {
            entities: self.entities.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: MappingSnapshot) {
        self.entities = snapshot.entities;
    }
}
