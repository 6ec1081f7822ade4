//! Hosted LLM clients (feature-gated)

#[cfg(feature = "google")]
pub mod google;
