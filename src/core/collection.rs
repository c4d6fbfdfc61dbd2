//! Byte-level key-value collections the rate tables are stored in

use crate::core::error::StoreError;
use async_trait::async_trait;

/// An ordered key-value collection.
///
/// Keys are never deleted. Rows are soft-deleted by rewriting them with a
/// deletion mark.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Returns every entry in ascending key order.
    async fn scan(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}
