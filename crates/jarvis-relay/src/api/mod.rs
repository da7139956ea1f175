// jarvis-relay/crates/jarvis-relay/src/api/mod.rs
//! API module - HTTP handlers for the chat relay

pub mod chat_api;
pub mod health_api;

// Re-export API handlers
pub use chat_api::{chat, clear_chat, relay_turn, ChatRequest, ChatResponse, ClearedResponse};
pub use health_api::{health, HealthResponse};
