//! # strata-mapping — domain-to-storage attribute mapping
//!
//! This crate knows how domain entities correspond to storage records:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MappingEntry`] | One rule linking a domain attribute to a storage attribute |
//! | [`MappingRegistry`] | Index of entries keyed by `(entity name, domain attribute)` |
//! | [`MappingDsl`] | Declarative per-entity builder that registers a set of entries |
//! | [`Mapper`] | Bidirectional conversion façade (`to_storage` / `to_entity`) |
//! | [`StorageClassResolver`] | External lookup of storage-class identifiers |
//!
//! # Quick start
//!
//! ```
//! use strata_mapping::{MappingDsl, MappingRegistry};
//! use strata_core::StorageKind;
//!
//! let mut registry = MappingRegistry::new();
//! MappingDsl::for_entity("billing.invoice")
//!     .storage(StorageKind::Relational, "billing.invoice_table")
//!     .attr("id", "id")
//!     .attr("amount", "amount_cents")
//!     .register(&mut registry)
//!     .unwrap();
//!
//! let entry = registry.find("billing.invoice", "amount").unwrap();
//! assert_eq!(entry.storage_attr(), Some("amount_cents"));
//! ```

pub mod dsl;
pub mod entry;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod resolver;

pub use dsl::MappingDsl;
pub use entry::{ComputedAttr, MappingEntry, MappingEntryBuilder};
pub use error::MappingError;
pub use mapper::{DomainExpr, ExistsError, Mapper, ToStorageOptions};
pub use registry::{MappingRegistry, MappingSnapshot};
pub use resolver::{StaticResolver, StorageClassResolver};
