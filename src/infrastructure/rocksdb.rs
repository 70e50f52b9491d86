use crate::domain::ports::LocalStorage;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding local storage entries.
pub const CF_LOCAL_STORAGE: &str = "local_storage";

/// Local storage persisted in RocksDB, so auth tokens survive between CLI runs.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbStorage {
    db: Arc<DB>,
}

impl RocksDbStorage {
    /// Opens or creates the database at `path`, creating the column family if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_LOCAL_STORAGE, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_LOCAL_STORAGE).ok_or_else(|| {
            CheckoutError::Storage("local storage column family not found".to_string())
        })
    }
}

fn decode(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CheckoutError::Storage(format!("non UTF-8 entry: {e}")))
}

#[async_trait]
impl LocalStorage for RocksDbStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.put_cf(cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let cf = self.cf()?;
        let mut keys = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            keys.push(decode(&key)?);
        }
        Ok(keys)
    }
}
