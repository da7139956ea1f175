// jarvis-relay/crates/jarvis-relay/src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod metrics;
pub mod prompts;
pub mod server;
pub mod shared_state;
pub mod telemetry;

// Public API exports
pub use memory::{ConversationMemory, Message, MemoryStore, Role, ShardedConversationMemory};
pub use config::Config;
pub use error::ChatError;
pub use gateway::{CompletionGateway, CompletionRequest, OpenAiGateway};
pub use server::{build_router, run_server};
pub use shared_state::AppState;

// API exports
pub use api::{
    chat_api::{chat, clear_chat, relay_turn, ChatRequest, ChatResponse},
    health_api::health,
};
