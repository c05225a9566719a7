// crates/warden-store/src/memory.rs
//
// In-memory ledger store. A single RwLock guards the whole map, so a commit
// is visible all at once or not at all.

use std::collections::BTreeMap;
use std::sync::RwLock;

use warden_core::error::WardenError;
use warden_core::ledger::{Table, WriteOp};
use warden_core::traits::LedgerStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<(Table, Vec<u8>), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries across all tables.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> WardenError {
    WardenError::Storage("memory store lock poisoned".to_string())
}

impl LedgerStore for MemoryStore {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, WardenError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(&(table, key.to_vec())).cloned())
    }

    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WardenError> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data
            .range((table, Vec::new())..)
            .take_while(|((t, _), _)| *t == table)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }

    fn commit(&self, writes: Vec<WriteOp>) -> Result<(), WardenError> {
        let mut data = self.data.write().map_err(poisoned)?;
        for write in writes {
            match write {
                WriteOp::Put { table, key, value } => {
                    data.insert((table, key), value);
                }
                WriteOp::Delete { table, key } => {
                    data.remove(&(table, key));
                }
            }
        }
        Ok(())
    }
}
