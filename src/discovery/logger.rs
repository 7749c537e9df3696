use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageLevel {
    Informational,
    Warning,
    Error,
}

/// Host-facing message channel. Shared across scan workers, so implementations are `Sync`.
pub trait MessageLogger: Send + Sync {
    fn send_message(&self, level: MessageLevel, message: &str);
}

/// Forwards host messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl MessageLogger for TracingLogger {
    fn send_message(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Informational => info!("{message}"),
            MessageLevel::Warning => warn!("{message}"),
            MessageLevel::Error => error!("{message}"),
        }
    }
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<(MessageLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl MessageLogger for MemoryLogger {
    fn send_message(&self, level: MessageLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
