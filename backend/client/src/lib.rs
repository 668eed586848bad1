//! HTTP API client for the ZeoRAG backend.
//!
//! Implements `zeorag_core::RagBackend` with `reqwest`; the base URL and
//! timeouts come from `zeorag_config::ClientConfig`.

pub mod http;

pub use http::HttpBackend;
