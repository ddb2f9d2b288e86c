//! Worker pool sizing
//!
//! Processing dominates total work, so it gets roughly three quarters of the
//! available parallelism and discovery the remaining quarter. Each pool needs
//! at least one worker; a split that cannot provide that refuses to start.

use crate::error::{Error, Result};

/// Validated worker counts for both pools. Queue capacities equal these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSizes {
    discovery: usize,
    processing: usize,
}

impl PoolSizes {
    /// Explicit sizes. Both must be non-zero.
    pub fn new(discovery: usize, processing: usize) -> Result<Self> {
        if discovery == 0 {
            return Err(Error::InvalidPoolSize(
                "discovery pool needs at least one worker".into(),
            ));
        }
        if processing == 0 {
            return Err(Error::InvalidPoolSize(
                "processing pool needs at least one worker".into(),
            ));
        }
        Ok(Self {
            discovery,
            processing,
        })
    }

    /// Split `parallelism` a quarter to discovery (at least one) and the rest
    /// to processing.
    pub fn from_parallelism(parallelism: usize) -> Result<Self> {
        let discovery = (parallelism / 4).max(1);
        let processing = parallelism.saturating_sub(discovery);
        Self::new(discovery, processing).map_err(|e| {
            Error::InvalidPoolSize(format!(
                "cannot split parallelism {parallelism} across both pools: {e}"
            ))
        })
    }

    /// Split the parallelism reported by the OS.
    pub fn detect() -> Result<Self> {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::from_parallelism(parallelism)
    }

    pub fn discovery(&self) -> usize {
        self.discovery
    }

    pub fn processing(&self) -> usize {
        self.processing
    }
}
