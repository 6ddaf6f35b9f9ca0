use crate::criteria::Criteria;
use crate::error::QueryError;
use crate::executor::QueryExecutor;
use crate::outcome::QueryOutcome;
use std::collections::HashMap;
use std::fmt;
use strata_core::{AttrValue, BackendError, Relation};
use strata_mapping::{ExistsError, Mapper};

/// The capability name a domain or exec operation resolves to:
/// `"shop.order"` → `"shop_order_query"`.
pub fn capability_name(name: &str) -> String {
    format!("{}_query", name.replace('.', "_"))
}

/// Produces the backend relation for a domain's standard-mode queries.
pub type RelationSource<R> = Box<dyn Fn(&Criteria) -> Result<R, BackendError> + Send + Sync>;

/// An exec-mode operation: runs verbatim, returns its result unmodified.
pub type ExecOperation = Box<dyn Fn(&Criteria) -> Result<AttrValue, BackendError> + Send + Sync>;

/// A repository serving one or more domains: a [`Mapper`] plus a typed
/// capability table declared at construction.
///
/// Capabilities replace runtime reflection probing: each domain a
/// repository serves registers a `"<domain>_query"` relation source with
/// [`query`](Self::query), and each exec operation registers a
/// `"<op>_query"` function with [`exec`](Self::exec). A criteria naming an
/// undeclared capability fails with
/// [`QueryError::MissingQueryMethod`] carrying the expected name.
///
/// # Example
///
/// ```ignore
/// let repo = Repository::new(mapper)
///     .query("shop.order", move |_criteria| Ok(orders.relation()))
///     .exec("order_stats", move |_criteria| Ok(json!({ "count": 12 })));
/// let outcome = repo.find(&Criteria::for_domain("shop.order"))?;
/// ```
pub struct Repository<R: Relation> {
    mapper: Mapper,
    queries: HashMap<String, RelationSource<R>>,
    execs: HashMap<String, ExecOperation>,
}

impl<R: Relation + 'static> Repository<R> {
    pub fn new(mapper: Mapper) -> Self {
        Self {
            mapper,
            queries: HashMap::new(),
            execs: HashMap::new(),
        }
    }

    /// Declare the standard-mode relation source for `domain_name`.
    pub fn query(
        mut self,
        domain_name: &str,
        source: impl Fn(&Criteria) -> Result<R, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.queries
            .insert(capability_name(domain_name), Box::new(source));
        self
    }

    /// Declare an exec-mode operation named `op`.
    pub fn exec(
        mut self,
        op: &str,
        operation: impl Fn(&Criteria) -> Result<AttrValue, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.execs.insert(capability_name(op), Box::new(operation));
        self
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Execute a criteria through the query state machine.
    pub fn find(&self, criteria: &Criteria) -> Result<QueryOutcome, QueryError> {
        QueryExecutor::new(self).execute(criteria)
    }

    /// Evaluate the criteria's existence expression against the backing
    /// storage class.
    pub fn exists(&self, criteria: &Criteria) -> Result<bool, QueryError> {
        let (expr, value) = criteria.exists_expr().ok_or_else(|| {
            QueryError::invalid_criteria("exists requires an existence expression")
        })?;
        self.mapper.exists(&expr, value).map_err(|err| match err {
            ExistsError::Mapping(err) => QueryError::Mapping(err),
            ExistsError::Backend(err) => QueryError::execution(criteria.domain_name(), err),
        })
    }

    pub(crate) fn relation_source(
        &self,
        domain_name: &str,
    ) -> Result<&RelationSource<R>, QueryError> {
        let capability = capability_name(domain_name);
        self.queries
            .get(&capability)
            .ok_or(QueryError::MissingQueryMethod { capability })
    }

    pub(crate) fn exec_operation(&self, op: &str) -> Result<&ExecOperation, QueryError> {
        let capability = capability_name(op);
        self.execs
            .get(&capability)
            .ok_or(QueryError::MissingQueryMethod { capability })
    }
}

impl<R: Relation> fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("queries", &self.queries.keys().collect::<Vec<_>>())
            .field("execs", &self.execs.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_replace_dots() {
        assert_eq!(capability_name("shop.order"), "shop_order_query");
        assert_eq!(capability_name("special"), "special_query");
    }
}
