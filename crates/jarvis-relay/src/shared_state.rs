//! Application state shared by every request handler.
//!
//! Constructed once at startup and handed to the router. Nothing here is a
//! process-wide singleton, so tests build as many independent instances as
//! they need.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::gateway::{CompletionGateway, OpenAiGateway};
use crate::memory::{ConversationMemory, MemoryStore, ShardedConversationMemory};

/// Lock-free counters for request logging
pub struct AtomicCounters {
    pub total_requests: AtomicUsize,
    pub fallback_replies: AtomicUsize,
}

impl AtomicCounters {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicUsize::new(0),
            fallback_replies: AtomicUsize::new(0),
        }
    }

    pub fn inc_total_requests(&self) -> usize {
        self.total_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn inc_fallback_replies(&self) -> usize {
        self.fallback_replies.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for AtomicCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Conversation windows, only touched through the store's own interface
    pub memory: Arc<dyn MemoryStore>,

    /// `None` when no provider credentials are configured
    pub gateway: Option<Arc<dyn CompletionGateway>>,

    /// Read-only after initialization
    pub config: Arc<Config>,

    pub counters: Arc<AtomicCounters>,
}

impl AppState {
    /// Wires the production memory store and gateway from configuration
    pub fn from_config(config: Config) -> Self {
        let memory: Arc<dyn MemoryStore> = if config.memory_sharded {
            Arc::new(ShardedConversationMemory::new(config.memory_window))
        } else {
            Arc::new(ConversationMemory::new(config.memory_window))
        };

        let gateway: Option<Arc<dyn CompletionGateway>> = if config.has_credentials() {
            Some(Arc::new(OpenAiGateway::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
            )))
        } else {
            info!("No provider API key configured; every chat turn will get the fallback reply");
            None
        };

        Self::new(config, memory, gateway)
    }

    pub fn new(
        config: Config,
        memory: Arc<dyn MemoryStore>,
        gateway: Option<Arc<dyn CompletionGateway>>,
    ) -> Self {
        Self {
            memory,
            gateway,
            config: Arc::new(config),
            counters: Arc::new(AtomicCounters::new()),
        }
    }
}
