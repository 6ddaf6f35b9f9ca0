//! End-to-end: mapping registry + mapper + repository over the in-memory
//! backend.

use serde_json::json;
use std::sync::Arc;
use strata_core::{PageSize, StorageKind};
use strata_mapping::{Mapper, MappingDsl, MappingRegistry};
use strata_memory::{MemoryBackend, MemoryRelation};
use strata_query::{Criteria, QueryOutcome, Repository};

fn order_repository() -> Repository<MemoryRelation> {
    let backend = Arc::new(MemoryBackend::new());
    let orders = backend.create_class("shop.order_table", "orders", "id");
    orders.seed([
        json!({ "id": 1, "status_code": "paid", "total_cents": 300, "number": "SO-1001" }),
        json!({ "id": 2, "status_code": "new", "total_cents": 100, "number": "SO-1002" }),
        json!({ "id": 3, "status_code": "paid", "total_cents": 200, "number": "SO-1003" }),
        json!({ "id": 4, "status_code": "paid", "total_cents": 500, "number": "SO-1004" }),
        json!({ "id": 5, "status_code": "cancelled", "total_cents": 50, "number": "SO-1005" }),
    ]);

    let mut registry = MappingRegistry::new();
    MappingDsl::for_entity("shop.order")
        .storage(StorageKind::Relational, "shop.order_table")
        .attr("id", "id")
        .attr("status", "status_code")
        .attr("total", "total_cents")
        .attr("number", "number")
        .register(&mut registry)
        .unwrap();

    let mapper = Mapper::new(Arc::new(registry), backend.clone());
    let query_class = orders.clone();
    Repository::new(mapper)
        .query("shop.order", move |_| Ok(query_class.relation()))
        .exec("order_count", {
            let orders = orders.clone();
            move |_| Ok(json!({ "count": orders.row_count() }))
        })
}

#[test]
fn filtered_ordered_limited_query_returns_domain_entities() {
    let repo = order_repository();
    let criteria = Criteria::for_domain("shop.order")
        .where_eq("status", json!("paid"))
        .order_by("total", false)
        .limit(2)
        .single_page();

    let outcome = repo.find(&criteria).unwrap();
    let collection = outcome.as_collection().unwrap();
    let items = collection.items().unwrap();

    let totals: Vec<_> = items.iter().map(|e| e["total"].as_u64().unwrap()).collect();
    assert_eq!(totals, [500, 300]);
    // storage columns never leak into entities
    assert!(items.iter().all(|e| e.get("total_cents").is_none()));
}

#[test]
fn pagination_metadata_matches_the_window() {
    let repo = order_repository();
    let criteria = Criteria::for_domain("shop.order")
        .order_by("id", true)
        .page(2, 2);

    let outcome = repo.find(&criteria).unwrap();
    let collection = outcome.as_collection().unwrap();
    assert_eq!(collection.len().unwrap(), 2);
    assert_eq!(collection.total_count().unwrap(), 5);
    assert_eq!(collection.total_pages().unwrap(), 3);
    assert_eq!(collection.current_page().unwrap(), 2);
    assert_eq!(collection.per_page().unwrap(), PageSize::Limited(2));

    let ids: Vec<_> = collection
        .items()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, [3, 4]);
}

#[test]
fn all_returns_everything_ordered() {
    let repo = order_repository();
    let outcome = repo
        .find(
            &Criteria::for_domain("shop.order")
                .all()
                .order_by("total", true)
                .single_page(),
        )
        .unwrap();
    let collection = outcome.as_collection().unwrap();
    assert_eq!(collection.total_count().unwrap(), 5);
    let totals: Vec<_> = collection
        .items()
        .unwrap()
        .iter()
        .map(|e| e["total"].as_u64().unwrap())
        .collect();
    assert_eq!(totals, [50, 100, 200, 300, 500]);
}

#[test]
fn single_with_empty_result_is_a_not_found_null_object() {
    let repo = order_repository();
    let outcome = repo
        .find(
            &Criteria::for_domain("shop.order")
                .where_eq("status", json!("refunded"))
                .single(),
        )
        .unwrap();
    match outcome {
        QueryOutcome::NotFound(not_found) => {
            assert_eq!(not_found.domain_name(), "shop.order");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn error_on_empty_is_a_value_keyed_by_the_domain() {
    let repo = order_repository();
    let outcome = repo
        .find(
            &Criteria::for_domain("shop.order")
                .where_gt("total", json!(10_000))
                .error_on_empty(),
        )
        .unwrap();
    match outcome {
        QueryOutcome::EmptyDataset(empty) => {
            assert_eq!(empty.domain_name(), "shop.order");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn single_returns_the_first_match() {
    let repo = order_repository();
    let outcome = repo
        .find(
            &Criteria::for_domain("shop.order")
                .where_eq("number", json!("SO-1003"))
                .single(),
        )
        .unwrap();
    let entity = outcome.as_entity().unwrap();
    assert_eq!(entity["id"], json!(3));
    assert_eq!(entity["status"], json!("paid"));
}

#[test]
fn exec_mode_runs_the_declared_operation_verbatim() {
    let repo = order_repository();
    let outcome = repo
        .find(&Criteria::for_domain("shop.order").exec("order_count"))
        .unwrap();
    assert_eq!(outcome.as_raw(), Some(&json!({ "count": 5 })));
}

#[test]
fn exists_delegates_through_the_mapping() {
    let repo = order_repository();
    assert!(repo
        .exists(&Criteria::for_domain("shop.order").exists_where("number", json!("SO-1001")))
        .unwrap());
    assert!(!repo
        .exists(&Criteria::for_domain("shop.order").exists_where("number", json!("SO-9999")))
        .unwrap());
}
