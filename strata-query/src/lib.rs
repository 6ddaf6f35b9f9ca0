//! # strata-query — criteria-driven query execution
//!
//! A [`Criteria`] describes *what* to fetch (target entity, filters, sort,
//! limit, pagination window, empty-result policy); a [`Repository`]
//! declares, at construction, *how* each domain resolves to a backend
//! relation; the [`QueryExecutor`] runs one against the other and produces
//! a [`QueryOutcome`].
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Criteria`], [`Pager`] | Backend-agnostic query intent |
//! | [`Repository`] | Mapper + typed capability table (`"<domain>_query"`) |
//! | [`QueryExecutor`] | Exec mode, `all` escape hatch, filter→order→limit, empty-result policy |
//! | [`EntityCollection`] | Lazily materialized, paginated entity sequence |
//! | [`QueryOutcome`] | Collection / single entity / not-found / empty-dataset / raw |
//! | [`QueryError`] | Missing capability, invalid criteria, wrapped execution failures |
//!
//! Empty results are *values*, not errors: the "error on empty dataset" and
//! "entity not found" outcomes come back as [`QueryOutcome`] variants so
//! callers inspect the return, never catch.

pub mod collection;
pub mod criteria;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod repository;

pub use collection::{EntityCollection, LoadedPage};
pub use criteria::{Criteria, Pager, DEFAULT_PAGE_SIZE};
pub use error::QueryError;
pub use executor::QueryExecutor;
pub use outcome::{EmptyDataset, EntityNotFound, QueryOutcome};
pub use repository::{capability_name, ExecOperation, RelationSource, Repository};
