//! Short-lived store of built matrices.
//!
//! A matrix is only meaningful while the caller is looking at it: route
//! queries run against it, and a refresh builds a new one. Entries expire
//! after a TTL and nothing is persisted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::config::DEFAULT_STORE_TTL;
use crate::matrix::MatrixResult;

/// Handle to a stored matrix: a random v4 UUID, shown as 32 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixId(Uuid);

impl MatrixId {
    fn random() -> Self {
        MatrixId(Uuid::new_v4())
    }
}

impl fmt::Display for MatrixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for MatrixId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(MatrixId)
    }
}

impl Serialize for MatrixId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Configuration for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_STORE_TTL,
            max_capacity: 100,
        }
    }
}

/// Built matrices keyed by [`MatrixId`].
#[derive(Clone)]
pub struct MatrixStore {
    entries: MokaCache<MatrixId, Arc<MatrixResult>>,
}

impl MatrixStore {
    pub fn new(config: &StoreConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        Self { entries }
    }

    pub async fn insert(&self, result: MatrixResult) -> (MatrixId, Arc<MatrixResult>) {
        let id = MatrixId::random();
        let entry = Arc::new(result);
        self.entries.insert(id, entry.clone()).await;
        (id, entry)
    }

    pub async fn get(&self, id: MatrixId) -> Option<Arc<MatrixResult>> {
        self.entries.get(&id).await
    }

    /// Drop a matrix before it expires.
    pub async fn remove(&self, id: MatrixId) {
        self.entries.invalidate(&id).await;
    }
}
