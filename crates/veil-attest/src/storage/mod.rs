mod config;
mod keys;
mod metrics;

pub use config::StorageConfig;
pub use metrics::{StorageMetrics, StorageMetricsSnapshot};

use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::sync::Arc;
use tracing::info;
use veil_types::{VeilError, VeilResult};

/// Durable state of the attestation service: group registry, commitment
/// store, nullifier ledger and invitation ledger, one sled tree each.
///
/// All mutation is append-only or insert-once; the only conditional
/// transitions (claim commit, invitation consumption) go through sled's
/// compare-and-swap so concurrent writers serialize at the storage layer,
/// never through in-process locks.
pub struct GroupStorage {
    db: Db,
    groups: Tree,
    commitments: Tree,
    claims: Tree,
    invitations: Tree,
    storage_config: StorageConfig,
    metrics: Arc<StorageMetrics>,
}

impl GroupStorage {
    pub fn open(config: StorageConfig) -> VeilResult<Self> {
        info!("Opening attestation storage at {:?}", config.path);

        let sled_config = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity_bytes)
            .mode(sled::Mode::HighThroughput);

        let sled_config = if let Some(flush_ms) = config.flush_every_ms {
            sled_config.flush_every_ms(Some(flush_ms))
        } else {
            sled_config.flush_every_ms(None)
        };

        let db = sled_config
            .open()
            .map_err(|e| VeilError::Storage(format!("Failed to open database: {}", e)))?;

        let storage = Self::create_from_db(db, config)?;
        info!("Attestation storage opened");
        Ok(storage)
    }

    /// Temporary database, dropped on close. Used by the test suite.
    pub fn in_memory() -> VeilResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| VeilError::Storage(format!("Failed to open temp database: {}", e)))?;

        let config = StorageConfig {
            path: std::path::PathBuf::new(),
            ..Default::default()
        };

        Self::create_from_db(db, config)
    }

    fn create_from_db(db: Db, config: StorageConfig) -> VeilResult<Self> {
        let groups = Self::open_tree(&db, "groups")?;
        let commitments = Self::open_tree(&db, "commitments")?;
        let claims = Self::open_tree(&db, "claims")?;
        let invitations = Self::open_tree(&db, "invitations")?;

        Ok(Self {
            db,
            groups,
            commitments,
            claims,
            invitations,
            storage_config: config,
            metrics: Arc::new(StorageMetrics::new()),
        })
    }

    fn open_tree(db: &Db, name: &str) -> VeilResult<Tree> {
        db.open_tree(name)
            .map_err(|e| VeilError::Storage(format!("Failed to open {} tree: {}", name, e)))
    }

    pub fn flush(&self) -> VeilResult<()> {
        self.metrics.bump_flushes();
        self.db
            .flush()
            .map_err(|e| VeilError::Storage(format!("Flush error: {}", e)))?;
        Ok(())
    }

    pub async fn flush_async(&self) -> VeilResult<()> {
        self.metrics.bump_flushes();
        self.db
            .flush_async()
            .await
            .map_err(|e| VeilError::Storage(format!("Flush error: {}", e)))?;
        Ok(())
    }

    pub fn tree_sizes(&self) -> TreeSizes {
        TreeSizes {
            groups: self.groups.len(),
            commitments: self.commitments.len(),
            claims: self.claims.len(),
            invitations: self.invitations.len(),
        }
    }

    pub fn storage_metrics(&self) -> Arc<StorageMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.storage_config
    }

    pub fn is_in_memory(&self) -> bool {
        self.storage_config.path.as_os_str().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSizes {
    pub groups: usize,
    pub commitments: usize,
    pub claims: usize,
    pub invitations: usize,
}

mod claims;
mod commitments;
mod groups;
mod invitations;

#[cfg(test)]
mod tests;
