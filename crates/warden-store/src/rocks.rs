// crates/warden-store/src/rocks.rs
//
// RocksDB-backed persistent ledger store.
//
// Key format: `{table_prefix}{raw_key}`, e.g. `verification:` followed by the
// 20 address bytes, or `nullifier:` followed by the 32 nullifier bytes.
// Values are the JSON bytes produced by `Transaction`. Each commit is a single
// `WriteBatch`, so a transaction lands completely or not at all.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};

use warden_core::error::WardenError;
use warden_core::ledger::{Table, WriteOp};
use warden_core::traits::LedgerStore;

/// RocksDB wrapper implementing the `LedgerStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, WardenError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| WardenError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        tracing::debug!("Opened ledger store at {}", path);
        Ok(Self { db })
    }

    /// Build the physical key: `{prefix}{key}`.
    fn physical_key(table: Table, key: &[u8]) -> Vec<u8> {
        let prefix = table.prefix().as_bytes();
        let mut out = Vec::with_capacity(prefix.len() + key.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(key);
        out
    }
}

impl LedgerStore for RocksStore {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, WardenError> {
        self.db
            .get(Self::physical_key(table, key))
            .map_err(|e| WardenError::Storage(format!("RocksDB get failed: {}", e)))
    }

    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WardenError> {
        let prefix = table.prefix().as_bytes();
        let mut rows = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) =
                item.map_err(|e| WardenError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Without a prefix extractor the iterator runs past the prefix.
            if !key.starts_with(prefix) {
                break;
            }
            rows.push((key[prefix.len()..].to_vec(), value.to_vec()));
        }

        Ok(rows)
    }

    fn commit(&self, writes: Vec<WriteOp>) -> Result<(), WardenError> {
        let count = writes.len();
        let mut batch = WriteBatch::default();
        for write in writes {
            match write {
                WriteOp::Put { table, key, value } => batch.put(Self::physical_key(table, &key), value),
                WriteOp::Delete { table, key } => batch.delete(Self::physical_key(table, &key)),
            }
        }
        self.db
            .write(batch)
            .map_err(|e| WardenError::Storage(format!("RocksDB batch write failed: {}", e)))?;
        tracing::trace!("Committed {} ledger writes", count);
        Ok(())
    }
}
