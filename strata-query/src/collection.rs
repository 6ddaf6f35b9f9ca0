use crate::error::QueryError;
use std::fmt;
use strata_core::{AttrValue, Lazy, PageSize};

/// One forced page: pagination metadata plus the materialized entities in
/// relation order.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub entities: Vec<AttrValue>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub per_page: PageSize,
}

/// A paginated, lazily materialized sequence of domain entities.
///
/// The deferred loader runs exactly once, on the first read of items or
/// metadata; every later read (concurrent or sequential) returns the cached
/// result without re-querying the backend. A failed load is cached the same
/// way: the collection stays failed and never retries.
pub struct EntityCollection {
    domain_name: String,
    page: Lazy<Result<LoadedPage, QueryError>>,
}

impl EntityCollection {
    pub fn deferred(
        domain_name: impl Into<String>,
        loader: impl FnOnce() -> Result<LoadedPage, QueryError> + Send + 'static,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            page: Lazy::new(loader),
        }
    }

    /// A collection that is already materialized (no backend behind it).
    pub fn loaded(domain_name: impl Into<String>, page: LoadedPage) -> Self {
        Self {
            domain_name: domain_name.into(),
            page: Lazy::ready(Ok(page)),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Whether the loader has already run.
    pub fn is_loaded(&self) -> bool {
        self.page.is_forced()
    }

    fn force(&self) -> Result<&LoadedPage, QueryError> {
        self.page.force().as_ref().map_err(QueryError::clone)
    }

    /// The materialized entities, in relation order. Forces the loader.
    pub fn items(&self) -> Result<&[AttrValue], QueryError> {
        Ok(&self.force()?.entities)
    }

    pub fn total_count(&self) -> Result<u64, QueryError> {
        Ok(self.force()?.total_count)
    }

    pub fn total_pages(&self) -> Result<u64, QueryError> {
        Ok(self.force()?.total_pages)
    }

    pub fn current_page(&self) -> Result<u64, QueryError> {
        Ok(self.force()?.current_page)
    }

    pub fn per_page(&self) -> Result<PageSize, QueryError> {
        Ok(self.force()?.per_page)
    }

    /// Number of entities on this page. Forces the loader.
    pub fn len(&self) -> Result<usize, QueryError> {
        Ok(self.force()?.entities.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueryError> {
        Ok(self.force()?.entities.is_empty())
    }
}

impl fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("EntityCollection");
        debug.field("domain_name", &self.domain_name);
        match self.page.get() {
            Some(Ok(page)) => debug.field("loaded", &page.entities.len()).finish(),
            Some(Err(err)) => debug.field("failed", &err.to_string()).finish(),
            None => debug.field("loaded", &false).finish(),
        }
    }
}
