//! # strata-core — shared foundation for the Strata data-mapping engine
//!
//! This crate carries the pieces every other Strata crate builds on:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AttrPath`] | Dotted attribute path with nested read/write semantics |
//! | [`Lazy`] | Thread-safe, memoized one-shot cell for deferred loading |
//! | [`StorageClass`] | Contract a storage backend implements per persisted shape |
//! | [`Relation`] | Filter/order/limit/paginate combinator contract |
//! | [`Predicate`], [`SortKey`] | Storage-column-level query primitives |
//! | [`BackendError`] | Error type backend implementations surface |
//!
//! Attribute values and raw storage records are plain JSON
//! ([`AttrValue`] / [`Record`]), so one value model serves relational,
//! key-value, and HTTP-shaped backends alike.

pub mod backend;
pub mod lazy;
pub mod path;

pub use backend::{
    BackendError, PageSize, Predicate, Relation, RelationPage, SortKey, StorageClass, StorageKind,
};
pub use lazy::Lazy;
pub use path::{AttrPath, PathError};

/// A single attribute value, domain- or storage-side.
pub type AttrValue = serde_json::Value;

/// A raw storage record (or a nested entity-attribute map).
pub type Record = serde_json::Map<String, AttrValue>;
