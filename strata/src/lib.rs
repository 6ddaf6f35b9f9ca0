//! # Strata — domain-to-storage mapping and query execution
//!
//! Strata translates in-memory domain entities into records of
//! heterogeneous storage backends (relational tables, key-value items,
//! remote HTTP resources) and back, and executes backend-agnostic
//! criteria that yield paginated collections of domain entities.
//!
//! The crates:
//!
//! | Crate | Feature | Contents |
//! |-------|---------|----------|
//! | `strata-core` | always | `AttrPath`, `Lazy`, backend contract traits |
//! | `strata-mapping` | `mapping` (default) | `MappingEntry`, `MappingRegistry`, `MappingDsl`, `Mapper` |
//! | `strata-query` | `query` (default) | `Criteria`, `Repository`, `QueryExecutor`, `EntityCollection` |
//! | `strata-memory` | `memory` | In-memory reference backend |
//!
//! # Example
//!
//! ```
//! use strata::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = MappingRegistry::new();
//! MappingDsl::for_entity("billing.invoice")
//!     .storage(StorageKind::Relational, "billing.invoice_table")
//!     .attr("id", "id")
//!     .attr("amount", "amount_cents")
//!     .register(&mut registry)?;
//!
//! let mapper = Mapper::new(Arc::new(registry), Arc::new(StaticResolver::new()));
//! let record = mapper.to_storage(
//!     "billing.invoice",
//!     &json!({ "id": 1, "amount": 42 }),
//!     &ToStorageOptions::default(),
//! )?;
//! assert_eq!(record.get("amount_cents"), Some(&json!(42)));
//! # Ok(())
//! # }
//! ```

pub use strata_core as core;

#[cfg(feature = "mapping")]
pub use strata_mapping as mapping;

#[cfg(feature = "query")]
pub use strata_query as query;

#[cfg(feature = "memory")]
pub use strata_memory as memory;

pub mod prelude {
    //! Re-exports of the most commonly used Strata types.
    pub use strata_core::{
        AttrPath, AttrValue, BackendError, Lazy, PageSize, Predicate, Record, Relation,
        RelationPage, SortKey, StorageClass, StorageKind,
    };

    #[cfg(feature = "mapping")]
    pub use strata_mapping::{
        DomainExpr, Mapper, MappingDsl, MappingEntry, MappingError, MappingRegistry,
        StaticResolver, StorageClassResolver, ToStorageOptions,
    };

    #[cfg(feature = "query")]
    pub use strata_query::{
        Criteria, EntityCollection, Pager, QueryError, QueryOutcome, Repository,
    };

    #[cfg(feature = "memory")]
    pub use strata_memory::{MemoryBackend, MemoryRelation};
}
