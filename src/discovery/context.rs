use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ConfigError;

/// Cooperative cancellation shared between the host and a running discovery.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Glob patterns over `Class.method`; a test is kept when any pattern matches.
#[derive(Debug, Clone)]
pub struct TestFilter {
    set: GlobSet,
}

impl TestFilter {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| ConfigError::invalid_filter(pattern, e.to_string()))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| ConfigError::invalid_filter(patterns.join(","), e.to_string()))?;

        Ok(Self { set })
    }

    pub fn matches(&self, class_name: &str, method_name: &str) -> bool {
        self.set.is_match(format!("{class_name}.{method_name}"))
    }
}

/// What the host hands to one discovery call besides the project list.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryContext {
    filter: Option<TestFilter>,
    cancellation: CancellationToken,
}

impl DiscoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: TestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn accepts(&self, class_name: &str, method_name: &str) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.matches(class_name, method_name))
    }
}
