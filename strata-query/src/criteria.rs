use strata_core::{AttrValue, PageSize, Predicate, SortKey};
use strata_mapping::DomainExpr;

/// Default page size when a criteria paginates without an explicit window.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// One query's pagination window: a 1-based page number plus a page size,
/// where [`PageSize::All`] means "single page" (the whole relation,
/// unpaged).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u64,
    per_page: PageSize,
}

impl Pager {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: PageSize::Limited(per_page),
        }
    }

    /// The unpaged window: everything in one page.
    pub fn single_page() -> Self {
        Self {
            page: 1,
            per_page: PageSize::All,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> PageSize {
        self.per_page
    }

    pub fn is_single_page(&self) -> bool {
        self.per_page == PageSize::All
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A backend-agnostic query intent: target entity, filter predicates, sort,
/// limit, pagination window, execution mode, single-vs-collection flag, and
/// empty-result policy.
///
/// Predicates and sort keys name *domain* attributes; the executor rewrites
/// them to storage columns through the mapper before they reach a backend.
///
/// # Example
///
/// ```
/// use strata_query::Criteria;
/// use serde_json::json;
///
/// let criteria = Criteria::for_domain("shop.order")
///     .where_eq("status", json!("paid"))
///     .order_by("placed_at", false)
///     .page(2, 50)
///     .error_on_empty();
/// assert_eq!(criteria.domain_name(), "shop.order");
/// ```
#[derive(Debug, Clone)]
pub struct Criteria {
    domain_name: String,
    predicates: Vec<Predicate>,
    sort: Vec<SortKey>,
    limit: Option<u64>,
    pager: Pager,
    exec: Option<String>,
    all: bool,
    single: bool,
    error_on_empty: bool,
    exists_expr: Option<(String, AttrValue)>,
}

impl Criteria {
    pub fn for_domain(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            predicates: Vec::new(),
            sort: Vec::new(),
            limit: None,
            pager: Pager::default(),
            exec: None,
            all: false,
            single: false,
            error_on_empty: false,
            exists_expr: None,
        }
    }

    // ── Builders ────────────────────────────────────────────────────────

    pub fn where_eq(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.predicates.push(Predicate::Eq {
            column: attr.into(),
            value,
        });
        self
    }

    pub fn where_not_eq(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.predicates.push(Predicate::NotEq {
            column: attr.into(),
            value,
        });
        self
    }

    pub fn where_gt(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.predicates.push(Predicate::Gt {
            column: attr.into(),
            value,
        });
        self
    }

    pub fn where_lt(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.predicates.push(Predicate::Lt {
            column: attr.into(),
            value,
        });
        self
    }

    pub fn where_like(mut self, attr: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Like {
            column: attr.into(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn where_in(mut self, attr: impl Into<String>, values: Vec<AttrValue>) -> Self {
        self.predicates.push(Predicate::In {
            column: attr.into(),
            values,
        });
        self
    }

    pub fn order_by(mut self, attr: impl Into<String>, ascending: bool) -> Self {
        self.sort.push(SortKey {
            column: attr.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        self.pager = Pager::new(page, per_page);
        self
    }

    /// Request the whole result as one unpaged page.
    pub fn single_page(mut self) -> Self {
        self.pager = Pager::single_page();
        self
    }

    /// Expect a single entity: the executor returns the first element of
    /// the forced collection, or an "entity not found" placeholder.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// The "give me everything, ordered" escape hatch: ordering only, no
    /// filter, no limit. Combining it with predicates or a limit is a
    /// usage error.
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    /// An empty result set becomes an [`EmptyDataset`](crate::EmptyDataset)
    /// outcome instead of an empty collection.
    pub fn error_on_empty(mut self) -> Self {
        self.error_on_empty = true;
        self
    }

    /// Name an explicit repository operation (`op` → `"<op>_query"`); the
    /// standard pipeline is bypassed and the operation's result returned
    /// verbatim.
    pub fn exec(mut self, op: impl Into<String>) -> Self {
        self.exec = Some(op.into());
        self
    }

    /// Attach the existence expression consumed by
    /// [`Repository::exists`](crate::Repository::exists).
    pub fn exists_where(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.exists_expr = Some((attr.into(), value));
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn is_exec(&self) -> bool {
        self.exec.is_some()
    }

    pub fn exec_op(&self) -> Option<&str> {
        self.exec.as_deref()
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    pub fn error_on_empty_dataset(&self) -> bool {
        self.error_on_empty
    }

    /// The existence expression as `(domain expression, expected value)`.
    pub fn exists_expr(&self) -> Option<(DomainExpr, &AttrValue)> {
        self.exists_expr
            .as_ref()
            .map(|(attr, value)| (DomainExpr::new(&self.domain_name, attr), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_plain_paged_collection() {
        let criteria = Criteria::for_domain("shop.order");
        assert!(!criteria.is_exec());
        assert!(!criteria.is_all());
        assert!(!criteria.is_single());
        assert!(!criteria.error_on_empty_dataset());
        assert_eq!(criteria.pager().page(), 1);
        assert_eq!(
            criteria.pager().per_page(),
            PageSize::Limited(DEFAULT_PAGE_SIZE)
        );
    }

    #[test]
    fn single_page_pager_is_unbounded() {
        let criteria = Criteria::for_domain("shop.order").single_page();
        assert!(criteria.pager().is_single_page());
        assert_eq!(criteria.pager().per_page(), PageSize::All);
    }

    #[test]
    fn predicates_accumulate_in_order() {
        let criteria = Criteria::for_domain("shop.order")
            .where_eq("status", json!("paid"))
            .where_gt("total", json!(100));
        let columns: Vec<_> = criteria.predicates().iter().map(Predicate::column).collect();
        assert_eq!(columns, ["status", "total"]);
    }

    #[test]
    fn exists_expr_carries_the_domain_name() {
        let criteria =
            Criteria::for_domain("shop.order").exists_where("number", json!("SO-1001"));
        let (expr, value) = criteria.exists_expr().unwrap();
        assert_eq!(expr.domain_name, "shop.order");
        assert_eq!(expr.domain_attr, "number");
        assert_eq!(value, &json!("SO-1001"));
    }
}
