use std::collections::HashMap;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    S(String),
    N(i64),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            AttributeValue::N(_) => None,
        }
    }

    pub fn as_n(&self) -> Option<i64> {
        match self {
            AttributeValue::N(n) => Some(*n),
            AttributeValue::S(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    S,
    N,
}

/// A flat, schemaless item as held by the backing store.
pub type Record = HashMap<String, AttributeValue>;

/// Layout of a collection: its name, the string key attribute, and the
/// remaining typed attributes. Backends with fixed columns use it to build
/// their table; schemaless backends ignore it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub key: String,
    pub attributes: Vec<(String, AttributeType)>,
}

impl TableSchema {
    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        if name == self.key {
            return Some(AttributeType::S);
        }
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, ty)| *ty)
    }
}

/// A list of `SET attribute = value` assignments applied by a conditional update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mutation {
    assignments: Vec<(String, AttributeValue)>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, attribute: impl Into<String>, value: AttributeValue) -> Self {
        self.assignments.push((attribute.into(), value));
        self
    }

    pub fn assignments(&self) -> &[(String, AttributeValue)] {
        &self.assignments
    }

    pub fn apply(&self, record: &mut Record) {
        for (attribute, value) in &self.assignments {
            record.insert(attribute.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The existence precondition of a conditional write did not hold.
    #[error("conditional check failed")]
    ConditionViolation,

    /// Transport, timeout, throttling or malformed-response failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal key-value backend. Every call may block on I/O.
pub trait Store {
    /// Full read of the collection, in no particular order.
    fn scan_all(&self) -> StoreResult<Vec<Record>>;

    /// Inserts `record` under `key` only if no record with that key exists.
    fn conditional_put(&self, key: &str, record: Record) -> StoreResult<()>;

    /// Applies `mutation` to the record under `key` only if it exists.
    fn conditional_update(&self, key: &str, mutation: &Mutation) -> StoreResult<()>;

    /// Removes the record under `key`. Absent keys are not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::adapters::memory_store::MemoryStore;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum FailOn {
        Scan,
        Put,
        Update,
        /// Fails once this many deletes have succeeded.
        DeleteAfter(usize),
    }

    /// Memory-backed store that reports a backend failure on one kind of call.
    #[derive(Clone)]
    pub struct FailingStore {
        pub inner: Arc<MemoryStore>,
        fail_on: FailOn,
        deletes: Arc<AtomicUsize>,
    }

    impl FailingStore {
        pub fn new(inner: Arc<MemoryStore>, fail_on: FailOn) -> Self {
            Self {
                inner,
                fail_on,
                deletes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failure() -> StoreError {
            StoreError::Backend("simulated throttling".to_string())
        }
    }

    impl Store for FailingStore {
        fn scan_all(&self) -> StoreResult<Vec<Record>> {
            if self.fail_on == FailOn::Scan {
                return Err(Self::failure());
            }
            self.inner.scan_all()
        }

        fn conditional_put(&self, key: &str, record: Record) -> StoreResult<()> {
            if self.fail_on == FailOn::Put {
                return Err(Self::failure());
            }
            self.inner.conditional_put(key, record)
        }

        fn conditional_update(&self, key: &str, mutation: &Mutation) -> StoreResult<()> {
            if self.fail_on == FailOn::Update {
                return Err(Self::failure());
            }
            self.inner.conditional_update(key, mutation)
        }

        fn delete(&self, key: &str) -> StoreResult<()> {
            if let FailOn::DeleteAfter(limit) = self.fail_on {
                if self.deletes.load(Ordering::SeqCst) >= limit {
                    return Err(Self::failure());
                }
            }
            self.inner.delete(key)?;
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
