//! Cache options.

use crossbeam::channel::Sender;

use crate::error::{Error, Result};

/// Options for [`crate::CycleCache::open`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Table-name namespace the rings live under.
    pub root: String,
    /// Minimum ring count preserved by rotation.
    pub min_rings: usize,
    /// Capacity of the promotion queue; readers block when it is full.
    pub promotion_backlog: usize,
    /// Most promotions moved per write transaction.
    pub max_batch_size: usize,
    /// Skip initialization, start no promoter, reject mutating calls.
    pub read_only: bool,
    /// Where the promoter reports batch failures. When absent, failures are
    /// counted and logged only.
    pub error_sink: Option<Sender<Error>>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: "cyc".to_string(),
            min_rings: 2,
            promotion_backlog: 10_000,
            max_batch_size: 1000,
            read_only: false,
            error_sink: None,
        }
    }
}

impl CacheConfig {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ring namespace.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the minimum ring count preserved by rotation.
    pub fn with_min_rings(mut self, min_rings: usize) -> Self {
        self.min_rings = min_rings;
        self
    }

    /// Set the promotion queue capacity.
    pub fn with_promotion_backlog(mut self, promotion_backlog: usize) -> Self {
        self.promotion_backlog = promotion_backlog;
        self
    }

    /// Set the per-transaction promotion batch cap.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Set read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the asynchronous error sink for the promoter.
    pub fn with_error_sink(mut self, sink: Sender<Error>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.root.is_empty() {
            return Err(Error::Configuration("root name must not be empty".into()));
        }
        if self.promotion_backlog == 0 {
            return Err(Error::Configuration(
                "promotion_backlog must be at least 1".into(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(Error::Configuration(
                "max_batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
