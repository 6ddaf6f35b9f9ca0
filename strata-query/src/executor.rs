use crate::collection::{EntityCollection, LoadedPage};
use crate::criteria::Criteria;
use crate::error::QueryError;
use crate::outcome::{EmptyDataset, EntityNotFound, QueryOutcome};
use crate::repository::Repository;
use strata_core::{Predicate, Relation, SortKey};
use strata_mapping::DomainExpr;
use tracing::trace;

/// Executes one [`Criteria`] against a repository's capability table.
///
/// Owned collaborator of [`Repository`] (composition, not mixin):
/// [`Repository::find`] constructs one per call. Standard mode applies
/// filter → order → limit in that fixed order — limit must act on the
/// final filtered/ordered set — then the empty-result policy, then wraps
/// the relation in a lazily loaded [`EntityCollection`]. Exec mode bypasses
/// all of that and returns the named operation's result verbatim.
pub struct QueryExecutor<'r, R: Relation> {
    repository: &'r Repository<R>,
}

impl<'r, R: Relation + 'static> QueryExecutor<'r, R> {
    pub fn new(repository: &'r Repository<R>) -> Self {
        Self { repository }
    }

    pub fn execute(&self, criteria: &Criteria) -> Result<QueryOutcome, QueryError> {
        if let Some(op) = criteria.exec_op() {
            return self.execute_exec(op, criteria);
        }
        self.execute_standard(criteria)
    }

    fn execute_exec(&self, op: &str, criteria: &Criteria) -> Result<QueryOutcome, QueryError> {
        let operation = self.repository.exec_operation(op)?;
        trace!(domain = criteria.domain_name(), %op, "dispatching exec-mode operation");
        let value =
            operation(criteria).map_err(|err| QueryError::execution(criteria.domain_name(), err))?;
        Ok(QueryOutcome::Raw(value))
    }

    fn execute_standard(&self, criteria: &Criteria) -> Result<QueryOutcome, QueryError> {
        let domain = criteria.domain_name();
        let source = self.repository.relation_source(domain)?;
        let relation = source(criteria).map_err(|err| QueryError::execution(domain, err))?;

        let relation = if criteria.is_all() {
            // "all" is the documented everything-ordered escape hatch: it
            // ignores limit/offset, and refuses to be combined with the
            // general conditions path.
            if !criteria.predicates().is_empty() {
                return Err(QueryError::invalid_criteria(
                    "an 'all' criteria cannot carry filter predicates",
                ));
            }
            if criteria.limit_value().is_some() {
                return Err(QueryError::invalid_criteria(
                    "an 'all' criteria cannot carry a limit",
                ));
            }
            self.apply_order(criteria, relation)?
        } else {
            let relation = self.apply_conditions(criteria, relation)?;
            let relation = self.apply_order(criteria, relation)?;
            self.apply_limit(criteria, relation)?
        };

        let empty = relation
            .is_empty()
            .map_err(|err| QueryError::execution(domain, err))?;
        if empty {
            if criteria.error_on_empty_dataset() {
                trace!(%domain, "empty relation: criteria demands an error");
                return Ok(QueryOutcome::EmptyDataset(EmptyDataset::new(domain)));
            }
            if criteria.is_single() {
                trace!(%domain, "empty relation: single result becomes a not-found placeholder");
                return Ok(QueryOutcome::NotFound(EntityNotFound::new(domain)));
            }
            // an empty collection is a valid result (e.g. list endpoints)
        }

        let collection = self.build_collection(criteria, relation);
        if criteria.is_single() {
            let first = collection.items()?.first().cloned();
            return Ok(match first {
                Some(entity) => QueryOutcome::Entity(entity),
                None => QueryOutcome::NotFound(EntityNotFound::new(domain)),
            });
        }
        Ok(QueryOutcome::Collection(collection))
    }

    fn apply_conditions(&self, criteria: &Criteria, relation: R) -> Result<R, QueryError> {
        if criteria.predicates().is_empty() {
            return Ok(relation);
        }
        let mapped = criteria
            .predicates()
            .iter()
            .map(|predicate| self.map_predicate(criteria, predicate))
            .collect::<Result<Vec<_>, _>>()?;
        relation
            .filter(&mapped)
            .map_err(|err| QueryError::execution(criteria.domain_name(), err))
    }

    fn apply_order(&self, criteria: &Criteria, relation: R) -> Result<R, QueryError> {
        if criteria.sort_keys().is_empty() {
            return Ok(relation);
        }
        let mapped = criteria
            .sort_keys()
            .iter()
            .map(|key| self.map_sort_key(criteria, key))
            .collect::<Result<Vec<_>, _>>()?;
        relation
            .order(&mapped)
            .map_err(|err| QueryError::execution(criteria.domain_name(), err))
    }

    fn apply_limit(&self, criteria: &Criteria, relation: R) -> Result<R, QueryError> {
        match criteria.limit_value() {
            Some(n) => relation
                .limit(n)
                .map_err(|err| QueryError::execution(criteria.domain_name(), err)),
            None => Ok(relation),
        }
    }

    /// Rewrite a predicate's domain attribute to its storage column.
    fn map_predicate(
        &self,
        criteria: &Criteria,
        predicate: &Predicate,
    ) -> Result<Predicate, QueryError> {
        let expr = DomainExpr::new(criteria.domain_name(), predicate.column());
        let column = self
            .repository
            .mapper()
            .storage_column(&expr)
            .map_err(|err| QueryError::execution(criteria.domain_name(), err))?;
        Ok(predicate.with_column(column))
    }

    fn map_sort_key(&self, criteria: &Criteria, key: &SortKey) -> Result<SortKey, QueryError> {
        let expr = DomainExpr::new(criteria.domain_name(), &key.column);
        let column = self
            .repository
            .mapper()
            .storage_column(&expr)
            .map_err(|err| QueryError::execution(criteria.domain_name(), err))?;
        Ok(key.with_column(column))
    }

    fn build_collection(&self, criteria: &Criteria, relation: R) -> EntityCollection {
        let domain = criteria.domain_name().to_string();
        let pager = *criteria.pager();
        let mapper = self.repository.mapper().clone();
        EntityCollection::deferred(criteria.domain_name(), move || {
            let page = relation
                .fetch_page(pager.page(), pager.per_page())
                .map_err(|err| QueryError::execution(&domain, err))?;
            let mut entities = Vec::with_capacity(page.records.len());
            for record in &page.records {
                let entity = mapper
                    .to_entity(&domain, record)
                    .map_err(|err| QueryError::execution(&domain, err))?;
                entities.push(entity);
            }
            Ok(LoadedPage {
                entities,
                total_count: page.total_count,
                total_pages: page.total_pages,
                current_page: page.current_page,
                per_page: page.per_page,
            })
        })
    }
}
