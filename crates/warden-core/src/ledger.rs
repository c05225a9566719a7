// crates/warden-core/src/ledger.rs
//
// Ledger tables and the buffered transaction every mutating operation runs in.
//
// A `Transaction` reads through to the store, buffers writes (reads see the
// buffer first), collects events, and hands everything to the store in one
// `commit`. Dropping a transaction without committing discards it, which is
// how rejected operations revert.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WardenError;
use crate::events::LedgerEvent;
use crate::traits::LedgerStore;

/// Logical tables of the ledger. Each maps to a key prefix in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    /// Singleton gate configuration.
    GateConfig,
    /// VerificationRecord by user address.
    Verifications,
    /// Consumed nullifier hashes -> timestamp consumed.
    Nullifiers,
    /// Vault addresses allowed to verify on behalf of users.
    Vaults,
    /// Risk registry singletons (config, breaker, alert total).
    RiskState,
    /// RiskAssessment by protocol address.
    Assessments,
    /// Alert count by protocol address.
    AlertCounts,
    /// Sentinel addresses.
    Sentinels,
}

impl Table {
    /// All tables, in prefix order.
    pub const ALL: [Table; 8] = [
        Table::GateConfig,
        Table::Verifications,
        Table::Nullifiers,
        Table::Vaults,
        Table::RiskState,
        Table::Assessments,
        Table::AlertCounts,
        Table::Sentinels,
    ];

    /// Key prefix used by byte-oriented backends.
    pub fn prefix(&self) -> &'static str {
        match self {
            Table::GateConfig => "gate_config:",
            Table::Verifications => "verification:",
            Table::Nullifiers => "nullifier:",
            Table::Vaults => "vault:",
            Table::RiskState => "risk_state:",
            Table::Assessments => "assessment:",
            Table::AlertCounts => "alerts:",
            Table::Sentinels => "sentinel:",
        }
    }
}

/// A single buffered mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put {
        table: Table,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        table: Table,
        key: Vec<u8>,
    },
}

/// An atomic unit of work against a ledger store.
pub struct Transaction<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
    pending: BTreeMap<(Table, Vec<u8>), Option<Vec<u8>>>,
    events: Vec<LedgerEvent>,
}

impl<'a, S: LedgerStore + ?Sized> Transaction<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            pending: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Read raw bytes, preferring this transaction's own pending writes.
    pub fn get_raw(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, WardenError> {
        if let Some(pending) = self.pending.get(&(table, key.to_vec())) {
            return Ok(pending.clone());
        }
        self.store.get(table, key)
    }

    /// Read and decode a JSON value.
    pub fn get<T: DeserializeOwned>(&self, table: Table, key: &[u8]) -> Result<Option<T>, WardenError> {
        match self.get_raw(table, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, table: Table, key: &[u8]) -> Result<bool, WardenError> {
        Ok(self.get_raw(table, key)?.is_some())
    }

    /// Buffer a JSON-encoded write.
    pub fn put<T: Serialize>(&mut self, table: Table, key: &[u8], value: &T) -> Result<(), WardenError> {
        let bytes = serde_json::to_vec(value)?;
        self.pending.insert((table, key.to_vec()), Some(bytes));
        Ok(())
    }

    pub fn delete(&mut self, table: Table, key: &[u8]) {
        self.pending.insert((table, key.to_vec()), None);
    }

    /// Queue an event; it is only released if the commit succeeds.
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Apply every buffered write atomically and return the queued events.
    pub fn commit(self) -> Result<Vec<LedgerEvent>, WardenError> {
        let writes: Vec<WriteOp> = self
            .pending
            .into_iter()
            .map(|((table, key), value)| match value {
                Some(value) => WriteOp::Put { table, key, value },
                None => WriteOp::Delete { table, key },
            })
            .collect();
        if !writes.is_empty() {
            self.store.commit(writes)?;
        }
        Ok(self.events)
    }
}

/// Decode every entry of a table into `(key, value)` pairs.
pub fn scan_table<S, T>(store: &S, table: Table) -> Result<Vec<(Vec<u8>, T)>, WardenError>
where
    S: LedgerStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .scan(table)?
        .into_iter()
        .map(|(key, bytes)| Ok((key, serde_json::from_slice(&bytes)?)))
        .collect()
}
