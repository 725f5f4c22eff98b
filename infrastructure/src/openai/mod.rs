//! OpenAI-compatible HTTP adapter
//!
//! Implements [`BackendGateway`](roundtable_application::BackendGateway) over
//! `POST /chat/completions` and `GET /models`.

pub mod error;
pub mod gateway;
pub mod protocol;
