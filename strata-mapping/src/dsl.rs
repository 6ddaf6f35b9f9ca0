use crate::entry::{ComputedAttr, MappingEntry};
use crate::error::MappingError;
use crate::registry::MappingRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use strata_core::{AttrValue, StorageKind};

/// Declarative per-entity mapping builder.
///
/// An entity (or the feature module that owns it) names itself once, names
/// its default storage classes once, then declares its attributes rule by
/// rule. [`register`](Self::register) builds every entry and inserts them
/// into a registry in declaration order.
///
/// # Example
///
/// ```
/// use strata_mapping::{MappingDsl, MappingRegistry};
/// use strata_core::StorageKind;
/// use serde_json::json;
///
/// let mut registry = MappingRegistry::new();
/// MappingDsl::for_entity("crm.contact")
///     .storage(StorageKind::Relational, "crm.contact_table")
///     .attr("id", "id")
///     .attr("address.city", "address_city")
///     .computed("schema_version", || json!(2))
///     .skip("draft_notes", "draft_notes")
///     .register(&mut registry)
///     .unwrap();
///
/// assert!(registry.has_entity_attr("crm.contact", "address.city"));
/// ```
pub struct MappingDsl {
    domain_name: String,
    storage: BTreeMap<StorageKind, String>,
    container: Option<String>,
    rules: Vec<AttrRule>,
}

struct AttrRule {
    domain_attr: String,
    storage_attr: Option<String>,
    computed: Option<ComputedAttr>,
    skip: bool,
    storage_override: BTreeMap<StorageKind, String>,
}

impl AttrRule {
    fn stored(domain_attr: impl Into<String>, storage_attr: impl Into<String>) -> Self {
        Self {
            domain_attr: domain_attr.into(),
            storage_attr: Some(storage_attr.into()),
            computed: None,
            skip: false,
            storage_override: BTreeMap::new(),
        }
    }
}

impl MappingDsl {
    pub fn for_entity(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            storage: BTreeMap::new(),
            container: None,
            rules: Vec::new(),
        }
    }

    /// Default storage class for every attribute of this entity.
    pub fn storage(mut self, kind: StorageKind, class: impl Into<String>) -> Self {
        self.storage.insert(kind, class.into());
        self
    }

    /// Provenance tag recorded on every entry (the DI namespace that
    /// supplied this mapping).
    pub fn container(mut self, tag: impl Into<String>) -> Self {
        self.container = Some(tag.into());
        self
    }

    /// Map `domain_attr` to the storage field `storage_attr`.
    pub fn attr(mut self, domain_attr: impl Into<String>, storage_attr: impl Into<String>) -> Self {
        self.rules.push(AttrRule::stored(domain_attr, storage_attr));
        self
    }

    /// Like [`attr`](Self::attr), but backed by a different storage class
    /// than the entity default.
    pub fn attr_in(
        mut self,
        domain_attr: impl Into<String>,
        storage_attr: impl Into<String>,
        kind: StorageKind,
        class: impl Into<String>,
    ) -> Self {
        let mut rule = AttrRule::stored(domain_attr, storage_attr);
        rule.storage_override.insert(kind, class.into());
        self.rules.push(rule);
        self
    }

    /// Map `domain_attr` to a computed value produced at conversion time
    /// instead of being read off the entity.
    pub fn computed(
        mut self,
        domain_attr: impl Into<String>,
        producer: impl Fn() -> AttrValue + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(AttrRule {
            domain_attr: domain_attr.into(),
            storage_attr: None,
            computed: Some(Arc::new(producer)),
            skip: false,
            storage_override: BTreeMap::new(),
        });
        self
    }

    /// Map `domain_attr` as skipped: excluded from `to_storage`, still read
    /// back by `to_entity`.
    pub fn skip(mut self, domain_attr: impl Into<String>, storage_attr: impl Into<String>) -> Self {
        let mut rule = AttrRule::stored(domain_attr, storage_attr);
        rule.skip = true;
        self.rules.push(rule);
        self
    }

    /// Build every declared entry and register it, in declaration order.
    ///
    /// The first invalid rule aborts with its definition error; rules
    /// already registered by this call stay registered (attribute-at-a-time
    /// semantics, same as registering the entries one by one).
    pub fn register(self, registry: &mut MappingRegistry) -> Result<(), MappingError> {
        for rule in self.rules {
            let mut builder = MappingEntry::builder()
                .domain_name(self.domain_name.as_str())
                .domain_attr(rule.domain_attr)
                .skip(rule.skip);
            for (kind, class) in &self.storage {
                builder = builder.storage(*kind, class.as_str());
            }
            for (kind, class) in &rule.storage_override {
                builder = builder.storage(*kind, class.as_str());
            }
            if let Some(attr) = rule.storage_attr {
                builder = builder.storage_attr(attr);
            }
            if let Some(producer) = rule.computed {
                builder = builder.computed(move || producer());
            }
            if let Some(tag) = &self.container {
                builder = builder.container(tag.as_str());
            }
            registry.register(builder.build()?);
        }
        Ok(())
    }
}
