//! # strata-memory — in-memory storage backend
//!
//! The reference implementation of the Strata backend contract: named
//! tables of JSON records behind `RwLock`s. It backs integration tests and
//! demos; real drivers (SQL, key-value, HTTP) are further backend crates
//! implementing the same [`StorageClass`]/[`Relation`] traits.
//!
//! # Quick start
//!
//! ```
//! use strata_memory::MemoryBackend;
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//! let orders = backend.create_class("shop.order_table", "orders", "id");
//! orders.seed([json!({ "id": 1, "status_code": "paid" })]);
//! assert_eq!(orders.relation().into_records().len(), 1);
//! ```

pub mod relation;

pub use relation::MemoryRelation;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use strata_core::{AttrValue, BackendError, Record, StorageClass};
use strata_mapping::StorageClassResolver;

/// One in-memory table: records plus the column that identifies them.
pub struct MemoryStorageClass {
    table: String,
    id_column: String,
    rows: RwLock<Vec<Record>>,
}

impl MemoryStorageClass {
    fn new(table: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Insert rows as given. Accepts JSON values for test ergonomics;
    /// non-object values are ignored.
    pub fn seed(&self, rows: impl IntoIterator<Item = AttrValue>) {
        let mut guard = self.write();
        for row in rows {
            if let AttrValue::Object(record) = row {
                guard.push(record);
            }
        }
    }

    /// A relation over a snapshot of the current rows, in insertion order.
    pub fn relation(&self) -> MemoryRelation {
        MemoryRelation::new(self.read().clone())
    }

    pub fn row_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Record>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Record>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageClass for MemoryStorageClass {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn create(&self, data: Record) -> Result<Record, BackendError> {
        self.write().push(data.clone());
        Ok(data)
    }

    fn update(&self, id: &AttrValue, data: Record) -> Result<Record, BackendError> {
        let mut rows = self.write();
        for row in rows.iter_mut() {
            if row.get(&self.id_column) == Some(id) {
                for (key, value) in data {
                    row.insert(key, value);
                }
                return Ok(row.clone());
            }
        }
        Err(BackendError::NotFound(format!(
            "no record with {} = {id} in '{}'",
            self.id_column, self.table
        )))
    }

    fn delete(&self, id: &AttrValue) -> Result<bool, BackendError> {
        let mut rows = self.write();
        let before = rows.len();
        rows.retain(|row| row.get(&self.id_column) != Some(id));
        Ok(rows.len() < before)
    }

    fn exists(&self, column: &str, value: &AttrValue) -> Result<bool, BackendError> {
        Ok(self.read().iter().any(|row| row.get(column) == Some(value)))
    }
}

/// A set of named in-memory storage classes; doubles as the
/// [`StorageClassResolver`] bootstrap code hands to a mapper.
#[derive(Default)]
pub struct MemoryBackend {
    classes: RwLock<HashMap<String, Arc<MemoryStorageClass>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a storage class under its fully qualified reference.
    pub fn create_class(
        &self,
        reference: impl Into<String>,
        table: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Arc<MemoryStorageClass> {
        let class = Arc::new(MemoryStorageClass::new(table, id_column));
        self.classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.into(), class.clone());
        class
    }

    pub fn class(&self, reference: &str) -> Option<Arc<MemoryStorageClass>> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned()
    }
}

impl StorageClassResolver for MemoryBackend {
    fn resolve(&self, reference: &str) -> Option<Arc<dyn StorageClass>> {
        self.class(reference).map(|class| class as Arc<dyn StorageClass>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> (MemoryBackend, Arc<MemoryStorageClass>) {
        let backend = MemoryBackend::new();
        let orders = backend.create_class("shop.order_table", "orders", "id");
        orders.seed([
            json!({ "id": 1, "status_code": "paid" }),
            json!({ "id": 2, "status_code": "new" }),
        ]);
        (backend, orders)
    }

    #[test]
    fn create_appends_a_record() {
        let (_, orders) = seeded();
        let mut data = Record::new();
        data.insert("id".into(), json!(3));
        let stored = orders.create(data).unwrap();
        assert_eq!(stored.get("id"), Some(&json!(3)));
        assert_eq!(orders.row_count(), 3);
    }

    #[test]
    fn update_merges_into_the_matching_record() {
        let (_, orders) = seeded();
        let mut data = Record::new();
        data.insert("status_code".into(), json!("shipped"));
        let updated = orders.update(&json!(2), data).unwrap();
        assert_eq!(updated.get("status_code"), Some(&json!("shipped")));
        assert_eq!(updated.get("id"), Some(&json!(2)));
    }

    #[test]
    fn update_unknown_id_reports_not_found() {
        let (_, orders) = seeded();
        let err = orders.update(&json!(99), Record::new()).unwrap_err();
        assert!(err.to_string().contains("orders"));
    }

    #[test]
    fn delete_reports_whether_something_was_removed() {
        let (_, orders) = seeded();
        assert!(orders.delete(&json!(1)).unwrap());
        assert!(!orders.delete(&json!(1)).unwrap());
        assert_eq!(orders.row_count(), 1);
    }

    #[test]
    fn exists_scans_a_column() {
        let (_, orders) = seeded();
        assert!(orders.exists("status_code", &json!("paid")).unwrap());
        assert!(!orders.exists("status_code", &json!("refunded")).unwrap());
    }

    #[test]
    fn backend_resolves_registered_references() {
        let (backend, _) = seeded();
        assert!(backend.resolve("shop.order_table").is_some());
        assert!(backend.resolve("shop.unknown").is_none());
    }
}
