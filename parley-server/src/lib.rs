//! Browser chat page for a local or hosted generation backend.
//!
//! History lives in the browser and is sent with every `POST /api/chat`, so
//! the server keeps no per-session state and concurrent tabs never share
//! anything mutable.

pub mod api;
pub mod server;

pub use api::{AppState, ChatRequest, ChatResponse, ModelsResponse};
pub use server::{build_router, run, start_server, MAX_BODY_BYTES};
