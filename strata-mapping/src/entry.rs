use crate::error::MappingError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strata_core::{AttrPath, AttrValue, StorageKind};

/// A zero-argument producer used instead of a stored value when converting
/// to storage.
pub type ComputedAttr = Arc<dyn Fn() -> AttrValue + Send + Sync>;

/// One immutable rule describing how a domain attribute corresponds to a
/// storage attribute within one or more storage classes.
///
/// Constructed through [`MappingEntry::builder`]; validation happens once,
/// at [`MappingEntryBuilder::build`]. Every entry belongs to exactly one
/// `(domain_name, domain_attr)` key in a registry.
#[derive(Clone)]
pub struct MappingEntry {
    domain_name: String,
    domain_attr: AttrPath,
    storage: BTreeMap<StorageKind, String>,
    storage_attr: Option<String>,
    computed_attr: Option<ComputedAttr>,
    skip: bool,
    container: Option<String>,
}

impl MappingEntry {
    pub fn builder() -> MappingEntryBuilder {
        MappingEntryBuilder::default()
    }

    /// Fully qualified entity identifier (`"feature.entity"`).
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Dotted attribute path on the entity.
    pub fn domain_attr(&self) -> &AttrPath {
        &self.domain_attr
    }

    /// The storage-class identifier registered for `kind`, if any.
    pub fn storage_ref(&self, kind: StorageKind) -> Option<&str> {
        self.storage.get(&kind).map(String::as_str)
    }

    /// The storage-class identifier used for backend resolution: the
    /// relational one when present, else the first registered kind.
    pub fn primary_storage_ref(&self) -> &str {
        self.storage
            .get(&StorageKind::Relational)
            .or_else(|| self.storage.values().next())
            .expect("a MappingEntry always has at least one storage class")
    }

    pub fn storage_kinds(&self) -> impl Iterator<Item = StorageKind> + '_ {
        self.storage.keys().copied()
    }

    /// Field/column name in the storage representation. `None` only for
    /// computed-only entries.
    pub fn storage_attr(&self) -> Option<&str> {
        self.storage_attr.as_deref()
    }

    pub fn computed_attr(&self) -> Option<&ComputedAttr> {
        self.computed_attr.as_ref()
    }

    /// Excluded from storage conversion; still read back by `to_entity`.
    pub fn is_skip(&self) -> bool {
        self.skip
    }

    /// Provenance tag (DI namespace that supplied this mapping). Never used
    /// for lookup.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// The storage field this entry writes to: `storage_attr` when present,
    /// else the dotted domain attribute itself (computed-only entries).
    pub(crate) fn storage_target(&self) -> String {
        match &self.storage_attr {
            Some(attr) => attr.clone(),
            None => self.domain_attr.to_string(),
        }
    }
}

impl fmt::Debug for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingEntry")
            .field("domain_name", &self.domain_name)
            .field("domain_attr", &self.domain_attr.to_string())
            .field("storage", &self.storage)
            .field("storage_attr", &self.storage_attr)
            .field(
                "computed_attr",
                &self.computed_attr.as_ref().map(|_| "<computed>"),
            )
            .field("skip", &self.skip)
            .field("container", &self.container)
            .finish()
    }
}

/// Builder for [`MappingEntry`]. `build` fails with
/// [`MappingError::Definition`] when a required field is missing.
#[derive(Default)]
pub struct MappingEntryBuilder {
    domain_name: Option<String>,
    domain_attr: Option<String>,
    storage: BTreeMap<StorageKind, String>,
    storage_attr: Option<String>,
    computed_attr: Option<ComputedAttr>,
    skip: bool,
    container: Option<String>,
}

impl MappingEntryBuilder {
    pub fn domain_name(mut self, name: impl Into<String>) -> Self {
        self.domain_name = Some(name.into());
        self
    }

    pub fn domain_attr(mut self, attr: impl Into<String>) -> Self {
        self.domain_attr = Some(attr.into());
        self
    }

    pub fn storage(mut self, kind: StorageKind, class: impl Into<String>) -> Self {
        self.storage.insert(kind, class.into());
        self
    }

    pub fn storage_attr(mut self, attr: impl Into<String>) -> Self {
        self.storage_attr = Some(attr.into());
        self
    }

    pub fn computed(mut self, producer: impl Fn() -> AttrValue + Send + Sync + 'static) -> Self {
        self.computed_attr = Some(Arc::new(producer));
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn container(mut self, tag: impl Into<String>) -> Self {
        self.container = Some(tag.into());
        self
    }

    pub fn build(self) -> Result<MappingEntry, MappingError> {
        let domain_name = match self.domain_name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(MappingError::definition("domain_name is required")),
        };
        let domain_attr = match self.domain_attr {
            Some(raw) => AttrPath::parse(&raw)
                .map_err(|err| MappingError::definition(format!("domain_attr: {err}")))?,
            None => return Err(MappingError::definition("domain_attr is required")),
        };
        if self.storage.is_empty() {
            return Err(MappingError::definition(
                "storage requires at least one storage class",
            ));
        }
        if let Some(attr) = &self.storage_attr {
            AttrPath::parse(attr)
                .map_err(|err| MappingError::definition(format!("storage_attr: {err}")))?;
        } else if self.computed_attr.is_none() {
            return Err(MappingError::definition(
                "either storage_attr or computed_attr is required",
            ));
        }
        Ok(MappingEntry {
            domain_name,
            domain_attr,
            storage: self.storage,
            storage_attr: self.storage_attr,
            computed_attr: self.computed_attr,
            skip: self.skip,
            container: self.container,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> MappingEntryBuilder {
        MappingEntry::builder()
            .domain_name("billing.invoice")
            .domain_attr("amount")
            .storage(StorageKind::Relational, "billing.invoice_table")
            .storage_attr("amount_cents")
    }

    #[test]
    fn builds_a_complete_entry() {
        let entry = base().build().unwrap();
        assert_eq!(entry.domain_name(), "billing.invoice");
        assert_eq!(entry.domain_attr().to_string(), "amount");
        assert_eq!(entry.storage_attr(), Some("amount_cents"));
        assert_eq!(
            entry.storage_ref(StorageKind::Relational),
            Some("billing.invoice_table")
        );
        assert!(!entry.is_skip());
        assert!(entry.container().is_none());
    }

    #[test]
    fn requires_domain_name() {
        let err = MappingEntry::builder()
            .domain_attr("amount")
            .storage(StorageKind::Relational, "t")
            .storage_attr("a")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("domain_name"));

        let err = base().domain_name("").build().unwrap_err();
        assert!(err.to_string().contains("domain_name"));
    }

    #[test]
    fn requires_domain_attr() {
        let err = MappingEntry::builder()
            .domain_name("billing.invoice")
            .storage(StorageKind::Relational, "t")
            .storage_attr("a")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("domain_attr"));
    }

    #[test]
    fn requires_at_least_one_storage_class() {
        let err = MappingEntry::builder()
            .domain_name("billing.invoice")
            .domain_attr("amount")
            .storage_attr("amount_cents")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("storage"));
    }

    #[test]
    fn requires_storage_attr_or_computed() {
        let err = MappingEntry::builder()
            .domain_name("billing.invoice")
            .domain_attr("amount")
            .storage(StorageKind::Relational, "t")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("storage_attr or computed_attr"));

        // computed alone is enough
        let entry = MappingEntry::builder()
            .domain_name("billing.invoice")
            .domain_attr("checksum")
            .storage(StorageKind::Relational, "t")
            .computed(|| json!("abc"))
            .build()
            .unwrap();
        assert!(entry.storage_attr().is_none());
        assert_eq!(entry.storage_target(), "checksum");
    }

    #[test]
    fn primary_storage_prefers_relational() {
        let entry = base()
            .storage(StorageKind::KeyValue, "cache.invoice")
            .build()
            .unwrap();
        assert_eq!(entry.primary_storage_ref(), "billing.invoice_table");

        let kv_only = MappingEntry::builder()
            .domain_name("billing.invoice")
            .domain_attr("amount")
            .storage(StorageKind::KeyValue, "cache.invoice")
            .storage_attr("amount_cents")
            .build()
            .unwrap();
        assert_eq!(kv_only.primary_storage_ref(), "cache.invoice");
    }
}
