use std::cmp::Ordering;
use strata_core::{
    AttrPath, AttrValue, BackendError, PageSize, Predicate, Record, Relation, RelationPage,
    SortKey,
};

/// A relation over an owned snapshot of records.
///
/// Combinators evaluate eagerly against the snapshot; predicate columns may
/// be dotted, in which case they walk nested record maps.
#[derive(Debug, Clone)]
pub struct MemoryRelation {
    records: Vec<Record>,
}

impl MemoryRelation {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn column<'r>(record: &'r Record, column: &str) -> Option<&'r AttrValue> {
        AttrPath::parse(column)
            .ok()
            .and_then(|path| path.read_map(record))
    }

    fn matches(record: &Record, predicate: &Predicate) -> bool {
        let current = Self::column(record, predicate.column());
        match predicate {
            Predicate::Eq { value, .. } => current == Some(value),
            Predicate::NotEq { value, .. } => current.is_some_and(|v| v != value),
            Predicate::Gt { value, .. } => {
                current.is_some_and(|v| compare_values(v, value) == Ordering::Greater)
            }
            Predicate::Lt { value, .. } => {
                current.is_some_and(|v| compare_values(v, value) == Ordering::Less)
            }
            Predicate::Like { pattern, .. } => current
                .and_then(AttrValue::as_str)
                .is_some_and(|v| like_match(v, pattern)),
            Predicate::In { values, .. } => current.is_some_and(|v| values.contains(v)),
        }
    }
}

impl Relation for MemoryRelation {
    fn filter(mut self, predicates: &[Predicate]) -> Result<Self, BackendError> {
        self.records
            .retain(|record| predicates.iter().all(|p| Self::matches(record, p)));
        Ok(self)
    }

    fn order(mut self, keys: &[SortKey]) -> Result<Self, BackendError> {
        self.records.sort_by(|a, b| {
            for key in keys {
                let left = Self::column(a, &key.column);
                let right = Self::column(b, &key.column);
                let ordering = match (left, right) {
                    (Some(l), Some(r)) => compare_values(l, r),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                let ordering = if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        Ok(self)
    }

    fn limit(mut self, n: u64) -> Result<Self, BackendError> {
        self.records.truncate(n as usize);
        Ok(self)
    }

    fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.records.is_empty())
    }

    fn fetch_page(&self, page: u64, per_page: PageSize) -> Result<RelationPage, BackendError> {
        let total_count = self.records.len() as u64;
        match per_page {
            PageSize::All => Ok(RelationPage {
                records: self.records.clone(),
                total_count,
                total_pages: 1,
                current_page: 1,
                per_page,
            }),
            PageSize::Limited(size) => {
                if size == 0 {
                    return Ok(RelationPage {
                        records: Vec::new(),
                        total_count,
                        total_pages: 0,
                        current_page: page,
                        per_page,
                    });
                }
                let current_page = page.max(1);
                let offset = ((current_page - 1) * size) as usize;
                let records = self
                    .records
                    .iter()
                    .skip(offset)
                    .take(size as usize)
                    .cloned()
                    .collect();
                Ok(RelationPage {
                    records,
                    total_count,
                    total_pages: total_count.div_ceil(size),
                    current_page,
                    per_page,
                })
            }
        }
    }
}

/// Total order over JSON values: null < bool < number < string < array <
/// object; numbers compare as f64, arrays/objects by their JSON text.
fn compare_values(a: &AttrValue, b: &AttrValue) -> Ordering {
    fn rank(value: &AttrValue) -> u8 {
        match value {
            AttrValue::Null => 0,
            AttrValue::Bool(_) => 1,
            AttrValue::Number(_) => 2,
            AttrValue::String(_) => 3,
            AttrValue::Array(_) => 4,
            AttrValue::Object(_) => 5,
        }
    }
    match (a, b) {
        (AttrValue::Bool(l), AttrValue::Bool(r)) => l.cmp(r),
        (AttrValue::Number(l), AttrValue::Number(r)) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(Ordering::Equal),
        (AttrValue::String(l), AttrValue::String(r)) => l.cmp(r),
        (AttrValue::Null, AttrValue::Null) => Ordering::Equal,
        (AttrValue::Array(_), AttrValue::Array(_))
        | (AttrValue::Object(_), AttrValue::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// SQL-`LIKE`-style matching with `%` wildcards.
fn like_match(value: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    let mut rest = value;
    for (idx, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if idx == 0 {
            match rest.strip_prefix(part) {
                Some(after) => rest = after,
                None => return false,
            }
        } else if idx == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    // no trailing literal: anything left is covered by the final `%`,
    // unless the pattern had no wildcards at all
    if parts.len() == 1 {
        rest.is_empty()
    } else {
        parts.last().is_some_and(|p| p.is_empty()) || rest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        [
            json!({ "id": 1, "status_code": "paid", "total_cents": 300 }),
            json!({ "id": 2, "status_code": "new", "total_cents": 100 }),
            json!({ "id": 3, "status_code": "paid", "total_cents": 200 }),
        ]
        .into_iter()
        .map(|v| match v {
            AttrValue::Object(record) => record,
            _ => unreachable!(),
        })
        .collect()
    }

    fn ids(relation: &MemoryRelation) -> Vec<u64> {
        relation
            .records
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn filter_applies_every_predicate() {
        let relation = MemoryRelation::new(records())
            .filter(&[
                Predicate::Eq {
                    column: "status_code".into(),
                    value: json!("paid"),
                },
                Predicate::Gt {
                    column: "total_cents".into(),
                    value: json!(250),
                },
            ])
            .unwrap();
        assert_eq!(ids(&relation), [1]);
    }

    #[test]
    fn filter_on_a_missing_column_matches_nothing() {
        let relation = MemoryRelation::new(records())
            .filter(&[Predicate::NotEq {
                column: "ghost".into(),
                value: json!(1),
            }])
            .unwrap();
        assert!(relation.is_empty().unwrap());
    }

    #[test]
    fn like_supports_percent_wildcards() {
        assert!(like_match("alice@example.com", "%@example.com"));
        assert!(like_match("alice@example.com", "alice%"));
        assert!(like_match("alice@example.com", "%example%"));
        assert!(like_match("alice@example.com", "alice@example.com"));
        assert!(!like_match("alice@example.com", "bob%"));
        assert!(!like_match("alice", "alice@%com"));
    }

    #[test]
    fn order_is_applied_per_key_with_direction() {
        let relation = MemoryRelation::new(records())
            .order(&[
                SortKey::asc("status_code"),
                SortKey::desc("total_cents"),
            ])
            .unwrap();
        assert_eq!(ids(&relation), [2, 1, 3]);
    }

    #[test]
    fn limit_truncates() {
        let relation = MemoryRelation::new(records()).limit(2).unwrap();
        assert_eq!(ids(&relation), [1, 2]);
    }

    #[test]
    fn fetch_page_slices_and_counts() {
        let relation = MemoryRelation::new(records());
        let page = relation.fetch_page(2, PageSize::Limited(2)).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn fetch_page_all_is_a_single_unbounded_page() {
        let relation = MemoryRelation::new(records());
        let page = relation.fetch_page(5, PageSize::All).unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn fetch_page_past_the_end_is_empty_but_counted() {
        let relation = MemoryRelation::new(records());
        let page = relation.fetch_page(9, PageSize::Limited(2)).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn dotted_columns_walk_nested_records() {
        let mut record = Record::new();
        record.insert("customer".into(), json!({ "city": "Lyon" }));
        let relation = MemoryRelation::new(vec![record])
            .filter(&[Predicate::Eq {
                column: "customer.city".into(),
                value: json!("Lyon"),
            }])
            .unwrap();
        assert_eq!(relation.records.len(), 1);
    }
}
