use dashmap::{DashMap, mapref::entry::Entry};

use crate::ports::store::{Mutation, Record, Store, StoreError, StoreResult};

/// Process-local store. Each key is guarded by its shard lock, so the
/// existence check and the write of a conditional operation happen atomically.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Store for MemoryStore {
    fn scan_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn conditional_put(&self, key: &str, record: Record) -> StoreResult<()> {
        match self.records.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StoreError::ConditionViolation),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    fn conditional_update(&self, key: &str, mutation: &Mutation) -> StoreResult<()> {
        match self.records.get_mut(key) {
            Some(mut record) => {
                mutation.apply(record.value_mut());
                Ok(())
            }
            None => Err(StoreError::ConditionViolation),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::store::AttributeValue;

    use super::*;

    fn record(key: &str, n: i64) -> Record {
        Record::from([
            ("id".to_string(), AttributeValue::S(key.to_string())),
            ("n".to_string(), AttributeValue::N(n)),
        ])
    }

    #[test]
    fn test_conditional_put_rejects_existing_key() {
        let store = MemoryStore::new();
        assert!(store.conditional_put("a", record("a", 1)).is_ok());
        assert_eq!(
            store.conditional_put("a", record("a", 2)),
            Err(StoreError::ConditionViolation)
        );
        assert_eq!(store.scan_all().unwrap(), vec![record("a", 1)]);
    }

    #[test]
    fn test_conditional_update_requires_existing_key() {
        let store = MemoryStore::new();
        let mutation = Mutation::new().set("n", AttributeValue::N(5));
        assert_eq!(
            store.conditional_update("a", &mutation),
            Err(StoreError::ConditionViolation)
        );
        assert!(store.is_empty());

        store.conditional_put("a", record("a", 1)).unwrap();
        store.conditional_update("a", &mutation).unwrap();
        assert_eq!(store.scan_all().unwrap(), vec![record("a", 5)]);
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let store = MemoryStore::new();
        store.conditional_put("a", record("a", 1)).unwrap();
        assert!(store.delete("missing").is_ok());
        assert!(store.delete("a").is_ok());
        assert!(store.delete("a").is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_puts_same_key_single_winner() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.conditional_put("same", record("same", i)))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|res| res.is_ok())
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
