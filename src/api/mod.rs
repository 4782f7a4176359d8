//! exd API Server module
//!
//! Provides the HTTP JSON API over the reader operations.
//! Run with `exd-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
