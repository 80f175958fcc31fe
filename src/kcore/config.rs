//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::error::KCoreError;

/// When the orchestrator compacts the scan domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Compact once, the first time fewer than `rebuild_constant * node_count`
    /// nodes remain.
    #[default]
    Once,
    /// Compact whenever fewer than `rebuild_constant * scan_domain_len` nodes
    /// remain, i.e. after every further drop in density by that factor.
    Repeated,
    /// Never compact; every wave scans the full id space.
    Never,
}

/// Configuration of a decomposition run.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use halo_kcore::{KCoreConfig, RebuildPolicy};
///
/// let config = KCoreConfig::from_json(r#"{ "concurrency": 8, "rebuild_policy": "repeated" }"#).unwrap();
/// assert_eq!(config.concurrency, 8);
/// assert_eq!(config.rebuild_policy, RebuildPolicy::Repeated);
/// assert_eq!(config.batch_size, KCoreConfig::DEFAULT_BATCH_SIZE);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KCoreConfig {
    /// Worker threads per wave.
    pub concurrency: usize,
    /// Scan-domain offsets claimed per atomic `fetch_add`.
    pub batch_size: usize,
    /// Remaining-node fraction below which the scan domain is compacted.
    pub rebuild_constant: f64,
    /// Compaction trigger.
    pub rebuild_policy: RebuildPolicy,
    /// Upper bound for the pre-flight memory estimate, if any.
    pub max_memory_bytes: Option<u64>,
}

impl KCoreConfig {
    /// Default worker count.
    pub const DEFAULT_CONCURRENCY: usize = 4;
    /// Default batch size.
    pub const DEFAULT_BATCH_SIZE: usize = 64;
    /// Default rebuild constant.
    pub const DEFAULT_REBUILD_CONSTANT: f64 = 0.1;

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, KCoreError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| KCoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the rebuild constant.
    #[must_use]
    pub fn with_rebuild_constant(mut self, rebuild_constant: f64) -> Self {
        self.rebuild_constant = rebuild_constant;
        self
    }

    /// Sets the rebuild policy.
    #[must_use]
    pub fn with_rebuild_policy(mut self, rebuild_policy: RebuildPolicy) -> Self {
        self.rebuild_policy = rebuild_policy;
        self
    }

    /// Sets the memory guard.
    #[must_use]
    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Checks every field; called before any allocation.
    pub fn validate(&self) -> Result<(), KCoreError> {
        if self.concurrency == 0 {
            return Err(KCoreError::InvalidConcurrency);
        }
        if self.batch_size == 0 {
            return Err(KCoreError::InvalidBatchSize);
        }
        let c = self.rebuild_constant;
        if !(c > 0.0 && c <= 1.0) {
            return Err(KCoreError::InvalidRebuildConstant(c));
        }
        Ok(())
    }

    /// `ceil(node_count * rebuild_constant)`: the largest compacted domain.
    pub fn rebuild_capacity(&self, node_count: u64) -> u64 {
        (node_count as f64 * self.rebuild_constant).ceil() as u64
    }
}

impl Default for KCoreConfig {
    fn default() -> Self {
        Self {
            concurrency: Self::DEFAULT_CONCURRENCY,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            rebuild_constant: Self::DEFAULT_REBUILD_CONSTANT,
            rebuild_policy: RebuildPolicy::Once,
            max_memory_bytes: None,
        }
    }
}
