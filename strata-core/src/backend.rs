use crate::{AttrValue, Record};
use serde::Serialize;
use std::fmt;

/// The kind of storage a class persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StorageKind {
    Relational,
    KeyValue,
    Http,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Relational => f.write_str("relational"),
            StorageKind::KeyValue => f.write_str("key-value"),
            StorageKind::Http => f.write_str("http"),
        }
    }
}

/// A single filter condition against a storage column.
///
/// At the criteria level the `column` field carries a *domain* attribute
/// name; the query executor rewrites it to the mapped storage column before
/// the predicate reaches a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    Eq { column: String, value: AttrValue },
    NotEq { column: String, value: AttrValue },
    Gt { column: String, value: AttrValue },
    Lt { column: String, value: AttrValue },
    Like { column: String, pattern: String },
    In { column: String, values: Vec<AttrValue> },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Eq { column, .. }
            | Predicate::NotEq { column, .. }
            | Predicate::Gt { column, .. }
            | Predicate::Lt { column, .. }
            | Predicate::Like { column, .. }
            | Predicate::In { column, .. } => column,
        }
    }

    /// The same condition against a different column name.
    pub fn with_column(&self, column: impl Into<String>) -> Predicate {
        let column = column.into();
        match self {
            Predicate::Eq { value, .. } => Predicate::Eq {
                column,
                value: value.clone(),
            },
            Predicate::NotEq { value, .. } => Predicate::NotEq {
                column,
                value: value.clone(),
            },
            Predicate::Gt { value, .. } => Predicate::Gt {
                column,
                value: value.clone(),
            },
            Predicate::Lt { value, .. } => Predicate::Lt {
                column,
                value: value.clone(),
            },
            Predicate::Like { pattern, .. } => Predicate::Like {
                column,
                pattern: pattern.clone(),
            },
            Predicate::In { values, .. } => Predicate::In {
                column,
                values: values.clone(),
            },
        }
    }
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub column: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// The same direction against a different column name.
    pub fn with_column(&self, column: impl Into<String>) -> SortKey {
        SortKey {
            column: column.into(),
            ascending: self.ascending,
        }
    }
}

/// Page size for one pagination window. `All` is the "single page" case:
/// the whole relation in one unbounded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageSize {
    Limited(u64),
    All,
}

impl PageSize {
    pub fn limit(self) -> Option<u64> {
        match self {
            PageSize::Limited(n) => Some(n),
            PageSize::All => None,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Limited(n) => write!(f, "{n}"),
            PageSize::All => f.write_str("all"),
        }
    }
}

/// One materialized page of raw storage records with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RelationPage {
    /// Records in relation order.
    pub records: Vec<Record>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub per_page: PageSize,
}

/// A backend relation/scope: the value a repository capability produces and
/// the query executor refines.
///
/// Combinators consume and return the relation by value, the same shape as
/// a fluent query builder. Each step may fail with a [`BackendError`];
/// implementations must apply steps exactly in the order they are called.
pub trait Relation: Sized + Send {
    fn filter(self, predicates: &[Predicate]) -> Result<Self, BackendError>;
    fn order(self, keys: &[SortKey]) -> Result<Self, BackendError>;
    fn limit(self, n: u64) -> Result<Self, BackendError>;

    fn is_empty(&self) -> Result<bool, BackendError>;

    /// Materialize one page. `page` is 1-based; `PageSize::All` returns the
    /// whole relation as a single page.
    fn fetch_page(&self, page: u64, per_page: PageSize) -> Result<RelationPage, BackendError>;
}

/// Contract a storage backend implements per persisted shape (a table, a
/// key-value model, an HTTP resource).
pub trait StorageClass: Send + Sync {
    fn table_name(&self) -> &str;

    fn create(&self, data: Record) -> Result<Record, BackendError>;
    fn update(&self, id: &AttrValue, data: Record) -> Result<Record, BackendError>;
    fn delete(&self, id: &AttrValue) -> Result<bool, BackendError>;

    /// True iff some record has `column == value`.
    fn exists(&self, column: &str, value: &AttrValue) -> Result<bool, BackendError>;
}

impl fmt::Debug for dyn StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClass")
            .field("table_name", &self.table_name())
            .finish()
    }
}

/// Errors surfaced by storage backends.
#[derive(Debug)]
pub enum BackendError {
    NotFound(String),
    Io(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl BackendError {
    /// Construct an `Io` variant from any error type.
    ///
    /// Used by backend crates to wrap driver-specific errors.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        BackendError::Io(Box::new(err))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotFound(msg) => write!(f, "not found: {msg}"),
            BackendError::Io(err) => write!(f, "backend I/O error: {err}"),
            BackendError::Other(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
